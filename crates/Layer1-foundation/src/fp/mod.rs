//! Functional core - Optional / Result / Task
//!
//! - `option.rs` - `from_nullable`, `OptionExt` (fold, alt)
//! - `result.rs` - `ResultExt` (fold)
//! - `task.rs` - `Task<E, A>`: 절대 panic/reject하지 않는 지연 비동기 계산
//! - `sequence.rs` - `sequence_seq`: 순차 실행 + 첫 실패에서 단락

mod option;
mod result;
mod sequence;
mod task;

pub use option::{from_nullable, OptionExt};
pub use result::ResultExt;
pub use sequence::sequence_seq;
pub use task::Task;
