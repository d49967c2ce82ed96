use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A unit of work in a download run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadTask {
    /// Client binary, asset index and libraries.
    FetchCoreBinary,
    /// Asset objects listed by the asset index.
    FetchAssetBundle,
}

impl fmt::Display for DownloadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadTask::FetchCoreBinary => write!(f, "core binary"),
            DownloadTask::FetchAssetBundle => write!(f, "asset bundle"),
        }
    }
}

/// Insertion-ordered queue holding each task kind at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQueue {
    tasks: VecDeque<DownloadTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the kind is already pending.
    pub fn push(&mut self, task: DownloadTask) -> bool {
        if self.tasks.contains(&task) {
            return false;
        }
        self.tasks.push_back(task);
        true
    }

    pub fn front(&self) -> Option<DownloadTask> {
        self.tasks.front().copied()
    }

    pub(crate) fn complete_front(&mut self) -> Option<DownloadTask> {
        self.tasks.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DownloadTask> + '_ {
        self.tasks.iter().copied()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

impl FromIterator<DownloadTask> for TaskQueue {
    fn from_iter<I: IntoIterator<Item = DownloadTask>>(iter: I) -> Self {
        let mut queue = TaskQueue::new();
        for task in iter {
            queue.push(task);
        }
        queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_rejected_and_order_kept() {
        let mut queue = TaskQueue::new();
        assert!(queue.push(DownloadTask::FetchAssetBundle));
        assert!(queue.push(DownloadTask::FetchCoreBinary));
        assert!(!queue.push(DownloadTask::FetchAssetBundle));

        let order: Vec<_> = queue.iter().collect();
        assert_eq!(
            order,
            vec![DownloadTask::FetchAssetBundle, DownloadTask::FetchCoreBinary]
        );
    }

    #[test]
    fn completed_kind_can_be_queued_again() {
        let mut queue: TaskQueue = [DownloadTask::FetchCoreBinary].into_iter().collect();
        assert_eq!(queue.complete_front(), Some(DownloadTask::FetchCoreBinary));
        assert!(queue.is_empty());
        assert!(queue.push(DownloadTask::FetchCoreBinary));
    }
}
