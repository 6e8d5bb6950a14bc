//! Ports - 抽象化レイヤー
//!
//! プロセッサが外部（UI アクション、表示側、時刻、ID）に依存する箇所を
//! trait として切り出しています。

pub mod clock;
pub mod id_generator;
pub mod observer;
pub mod operation;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::observer::TaskObserver;
pub use self::operation::{FnOperation, Operation, operation_fn};
