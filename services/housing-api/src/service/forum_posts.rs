//! Forum posts and reply threads.
//!
//! Threads are materialized without recursion: replies are fetched one level
//! at a time for the whole frontier, then each tree is assembled from an
//! explicit stack with a visited set. A node whose replies were not expanded,
//! because of the depth cap or a parent cycle, is marked `truncated`.
use super::{
    RecordService, ServiceError, ServiceResult, acting_user, not_owner, record_created,
    record_deleted, record_updated, validate,
};
use crate::model::{
    ForumPost, ForumPostPatch, ForumPostWrite, ForumThread, NewForumPost, RecordId,
};
use housing_authz::{Action, Actor, EntityKind};
use std::collections::{HashMap, HashSet};

const ENTITY: EntityKind = EntityKind::ForumPost;

type ReplyIndex = HashMap<RecordId, Vec<ForumPost>>;

fn check_patch(patch: &ForumPostPatch) -> ServiceResult<()> {
    if let Some(title) = &patch.title {
        validate::required("title", title, validate::TITLE_MAX)?;
    }
    if let Some(content) = &patch.content {
        validate::required_text("content", content)?;
    }
    Ok(())
}

/// Builds one tree rooted at `root`. Nodes deeper than `max_depth` reply
/// levels are left unexpanded.
fn assemble_thread(
    root: ForumPost,
    replies: &ReplyIndex,
    max_depth: usize,
) -> Option<ForumThread> {
    struct Slot {
        thread: ForumThread,
        parent: Option<usize>,
    }

    let mut slots: Vec<Slot> = Vec::new();
    let mut visited: HashSet<RecordId> = HashSet::new();
    let mut stack: Vec<(ForumPost, Option<usize>, usize)> = vec![(root, None, 0)];

    // Pre-order walk: every child lands after its parent in `slots`.
    while let Some((post, parent, depth)) = stack.pop() {
        let index = slots.len();
        visited.insert(post.id);
        let children = replies.get(&post.id).map(Vec::as_slice).unwrap_or_default();
        let mut truncated = false;
        if depth >= max_depth {
            truncated = !children.is_empty();
        } else {
            for child in children.iter().rev() {
                if visited.contains(&child.id) {
                    truncated = true;
                    continue;
                }
                stack.push((child.clone(), Some(index), depth + 1));
            }
        }
        slots.push(Slot {
            thread: ForumThread {
                post,
                replies: Vec::new(),
                truncated,
            },
            parent,
        });
    }

    // Fold back to front; a node's subtree is complete once it is popped,
    // and the root (the only slot without a parent) comes out last.
    while let Some(slot) = slots.pop() {
        let mut thread = slot.thread;
        thread.replies.reverse();
        match slot.parent {
            Some(parent) => slots[parent].thread.replies.push(thread),
            None => return Some(thread),
        }
    }
    None
}

fn count_truncated(thread: &ForumThread) -> usize {
    let mut count = 0;
    let mut pending = vec![thread];
    while let Some(node) = pending.pop() {
        count += usize::from(node.truncated);
        pending.extend(node.replies.iter());
    }
    count
}

impl RecordService {
    /// Replies of every post reachable from `roots`, grouped by parent, newest
    /// first within each group. Fetches at most `forum_max_depth + 1` levels.
    async fn reply_index(&self, roots: &[ForumPost]) -> ServiceResult<ReplyIndex> {
        let mut index: ReplyIndex = HashMap::new();
        let mut expanded: HashSet<RecordId> = HashSet::new();
        let mut frontier: Vec<RecordId> = roots.iter().map(|post| post.id).collect();
        for _ in 0..=self.options.forum_max_depth {
            frontier.retain(|id| expanded.insert(*id));
            if frontier.is_empty() {
                break;
            }
            let replies = self.store.list_replies(&frontier).await?;
            frontier = replies.iter().map(|post| post.id).collect();
            for reply in replies {
                if let Some(parent) = reply.parent_post {
                    index.entry(parent).or_default().push(reply);
                }
            }
        }
        Ok(index)
    }

    async fn threads(&self, roots: Vec<ForumPost>) -> ServiceResult<Vec<ForumThread>> {
        let index = self.reply_index(&roots).await?;
        let max_depth = self.options.forum_max_depth;
        let threads: Vec<ForumThread> = roots
            .into_iter()
            .filter_map(|root| assemble_thread(root, &index, max_depth))
            .collect();
        for thread in &threads {
            let truncated = count_truncated(thread);
            if truncated > 0 {
                tracing::warn!(
                    post_id = thread.post.id,
                    truncated_nodes = truncated,
                    max_depth,
                    "forum thread truncated"
                );
            }
        }
        Ok(threads)
    }

    /// With `strict_ownership`, only the author or an administrator may
    /// change or remove a post.
    fn check_author(&self, actor: &Actor, post: &ForumPost, action: Action) -> ServiceResult<()> {
        if !self.options.strict_ownership
            || actor.is_administrator()
            || actor.user_id() == Some(post.user)
        {
            Ok(())
        } else {
            Err(not_owner(ENTITY, action))
        }
    }

    pub async fn create_forum_post(
        &self,
        actor: &Actor,
        write: ForumPostWrite,
    ) -> ServiceResult<ForumThread> {
        self.authorize(actor, ENTITY, Action::Create)?;
        let user = acting_user(actor)?;
        check_patch(&ForumPostPatch::from(write.clone()))?;
        let post = self
            .store
            .create_forum_post(NewForumPost {
                user,
                title: write.title,
                content: write.content,
                parent_post: write.parent_post,
            })
            .await?;
        record_created(ENTITY);
        Ok(ForumThread {
            post,
            replies: Vec::new(),
            truncated: false,
        })
    }

    /// Every post, each with its nested replies.
    pub async fn list_forum_posts(&self, actor: &Actor) -> ServiceResult<Vec<ForumThread>> {
        self.authorize(actor, ENTITY, Action::Read)?;
        let posts = self.store.list_forum_posts().await?;
        self.threads(posts).await
    }

    pub async fn get_forum_post(&self, actor: &Actor, id: RecordId) -> ServiceResult<ForumThread> {
        self.authorize(actor, ENTITY, Action::Read)?;
        let post = self.store.get_forum_post(id).await?;
        let mut threads = self.threads(vec![post]).await?;
        threads
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("forum post {id}")))
    }

    pub async fn update_forum_post(
        &self,
        actor: &Actor,
        id: RecordId,
        patch: ForumPostPatch,
    ) -> ServiceResult<ForumThread> {
        self.authorize(actor, ENTITY, Action::Update)?;
        check_patch(&patch)?;
        let current = self.store.get_forum_post(id).await?;
        self.check_author(actor, &current, Action::Update)?;
        let post = self.store.update_forum_post(id, patch).await?;
        record_updated(ENTITY);
        let mut threads = self.threads(vec![post]).await?;
        threads
            .pop()
            .ok_or_else(|| ServiceError::NotFound(format!("forum post {id}")))
    }

    /// Removes the post and all of its replies.
    pub async fn delete_forum_post(&self, actor: &Actor, id: RecordId) -> ServiceResult<()> {
        self.authorize(actor, ENTITY, Action::Delete)?;
        let current = self.store.get_forum_post(id).await?;
        self.check_author(actor, &current, Action::Delete)?;
        self.store.delete_forum_post(id).await?;
        record_deleted(ENTITY);
        Ok(())
    }
}
