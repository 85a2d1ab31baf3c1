//! 순차 결합자
//!
//! 앞 단계의 부수 효과(예: 스크립트 권한 변경)가 끝나야 다음 단계(서버 시작)가
//! 의미가 있으므로 병렬이 아니라 하나씩 실행한다.

use super::Task;
use std::sync::Arc;

/// Task 목록을 index 0부터 순서대로 실행
///
/// 첫 실패에서 즉시 멈추고 그 실패를 그대로 돌려준다 (남은 Task는 실행하지
/// 않음). 모두 성공하면 각 결과를 순서대로 담은 `Vec`. 빈 목록은 `Ok(vec![])`.
pub fn sequence_seq<E, A>(tasks: Vec<Task<E, A>>) -> Task<E, Vec<A>>
where
    E: Send + 'static,
    A: Send + 'static,
{
    let tasks: Arc<[Task<E, A>]> = tasks.into();

    Task::new(move || {
        let tasks = Arc::clone(&tasks);
        async move {
            let mut values = Vec::with_capacity(tasks.len());
            for task in tasks.iter() {
                values.push(task.run().await?);
            }
            Ok(values)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recording(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str, ok: bool) -> Task<String, &'static str> {
        let log = Arc::clone(log);
        Task::new(move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().push(name);
                tokio::task::yield_now().await;
                if ok {
                    Ok(name)
                } else {
                    Err(format!("{} failed", name))
                }
            }
        })
    }

    #[tokio::test]
    async fn test_empty_sequence() {
        let task = sequence_seq::<String, i32>(vec![]);
        assert_eq!(task.run().await, Ok(vec![]));
    }

    #[tokio::test]
    async fn test_all_succeed_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let task = sequence_seq(vec![recording(&log, "a", true), recording(&log, "b", true)]);

        assert_eq!(task.run().await, Ok(vec!["a", "b"]));
        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let task = sequence_seq(vec![
            recording(&log, "a", false),
            recording(&log, "b", true),
        ]);

        assert_eq!(task.run().await, Err("a failed".to_string()));
        assert_eq!(*log.lock(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_failure_in_the_middle() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let task = sequence_seq(vec![
            recording(&log, "a", true),
            recording(&log, "b", false),
            recording(&log, "c", true),
        ]);

        assert_eq!(task.run().await, Err("b failed".to_string()));
        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_sequence_is_rerunnable() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let task = sequence_seq(vec![recording(&log, "a", true)]);

        assert_eq!(task.run().await, Ok(vec!["a"]));
        assert_eq!(task.run().await, Ok(vec!["a"]));
        assert_eq!(log.lock().len(), 2);
    }
}
