/// Answer mechanics: grading a submission against a task.
use crate::mechanics::tasks::Task;

/// Copy of `task` with the submission and its verdict attached.
#[inline]
pub fn check(task: &Task, submitted: u32) -> Task {
    Task {
        user_answer: Some(submitted),
        is_correct: Some(submitted == task.answer),
        ..task.clone()
    }
}

/// Tasks graded as wrong.
pub fn incorrect(tasks: &[Task]) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| t.is_correct == Some(false))
        .cloned()
        .collect()
}

/// True when every task is graded and correct. Ungraded tasks count as not correct.
#[inline]
pub fn all_correct(tasks: &[Task]) -> bool {
    tasks.iter().all(|t| t.is_correct == Some(true))
}
