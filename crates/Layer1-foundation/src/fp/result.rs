//! Result helpers
//!
//! `Result<A, E>`는 성공 쪽으로 편향되어 있다: `map` / `and_then`은 `Ok`에만
//! 작용하고 `Err`는 그대로 통과한다. 표준에 없는 소거 형태 `fold`만 보충.

/// Result 확장 (fold)
pub trait ResultExt<A, E> {
    /// 실패 / 성공 분기를 하나의 값으로 접는다
    fn fold<B>(self, on_err: impl FnOnce(E) -> B, on_ok: impl FnOnce(A) -> B) -> B;
}

impl<A, E> ResultExt<A, E> for Result<A, E> {
    fn fold<B>(self, on_err: impl FnOnce(E) -> B, on_ok: impl FnOnce(A) -> B) -> B {
        match self {
            Ok(value) => on_ok(value),
            Err(err) => on_err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold() {
        let ok: Result<i32, String> = Ok(3);
        let err: Result<i32, String> = Err("nope".to_string());

        assert_eq!(ok.fold(|e| e.len() as i32, |v| v + 1), 4);
        assert_eq!(err.fold(|e| e.len() as i32, |v| v + 1), 4);
    }

    #[test]
    fn test_map_over_failure_is_noop() {
        let err: Result<i32, &str> = Err("failed");
        let mapped = err.map(|v| v * 2).and_then(|v| Ok::<_, &str>(v + 1));
        assert_eq!(mapped, Err("failed"));

        let remapped = mapped.map_err(|e| e.to_uppercase());
        assert_eq!(remapped, Err("FAILED".to_string()));
    }
}
