//! Optional helpers
//!
//! `Option<T>`이 그대로 Optional 역할을 한다. 표준 메서드로 없는 것만 보충:
//! - `from_nullable`: JSON `null`과 누락을 모두 absent로
//! - `OptionExt::fold`: 유일한 소거(elimination) 형태
//! - `OptionExt::alt`: 지연 평가되는 대체값

use serde_json::Value;

/// nullable 원시 값을 Optional로 변환
///
/// 키 자체가 없거나 값이 JSON `null`이면 absent. `0`, `""`, `false` 같은
/// falsy 값은 그대로 present로 남는다.
pub fn from_nullable(value: Option<Value>) -> Option<Value> {
    value.filter(|v| !v.is_null())
}

/// Option 확장 (fold / alt)
pub trait OptionExt<T> {
    /// absent / present 분기를 하나의 값으로 접는다
    fn fold<B>(self, on_absent: impl FnOnce() -> B, on_present: impl FnOnce(T) -> B) -> B;

    /// present면 자기 자신, 아니면 fallback을 평가한다 (지연)
    fn alt(self, fallback: impl FnOnce() -> Option<T>) -> Option<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn fold<B>(self, on_absent: impl FnOnce() -> B, on_present: impl FnOnce(T) -> B) -> B {
        match self {
            Some(value) => on_present(value),
            None => on_absent(),
        }
    }

    fn alt(self, fallback: impl FnOnce() -> Option<T>) -> Option<T> {
        self.or_else(fallback)
    }
}
