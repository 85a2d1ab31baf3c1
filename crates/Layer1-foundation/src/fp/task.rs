//! Task - 지연 실행되는 비동기 계산
//!
//! `Task<E, A>`는 인자 없는 재호출 가능한 작업 단위다. `run()`을 호출할 때마다
//! 새 future가 만들어지고, 그 future는 항상 `Result<A, E>`로 끝난다.
//!
//! 외부 효과의 에러(그리고 panic)를 값으로 바꾸는 곳은 `try_catch` 한 군데뿐이다.

use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

type RunFn<E, A> = dyn Fn() -> BoxFuture<'static, Result<A, E>> + Send + Sync;

/// 지연 비동기 계산
pub struct Task<E, A> {
    run: Arc<RunFn<E, A>>,
}

impl<E, A> Clone for Task<E, A> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<E, A> std::fmt::Debug for Task<E, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

impl<E, A> Task<E, A>
where
    E: Send + 'static,
    A: Send + 'static,
{
    /// 이미 `Result`를 돌려주는 future 생성 함수로부터 Task 생성
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<A, E>> + Send + 'static,
    {
        Self {
            run: Arc::new(move || f().boxed()),
        }
    }

    /// 실패할 수 있는 외부 작업을 감싼다
    ///
    /// `run`의 future가 `Err`로 끝나거나, `run` 호출 또는 future 폴링 중
    /// panic이 나면 `on_error`로 변환된 `Err`가 된다. 반환된 future 자체는
    /// 절대 panic을 전파하지 않는다. `on_error`는 panic하지 않아야 한다.
    pub fn try_catch<F, Fut, X, H>(run: F, on_error: H) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<A, X>> + Send + 'static,
        X: Into<anyhow::Error>,
        H: Fn(anyhow::Error) -> E + Send + Sync + 'static,
    {
        let on_error = Arc::new(on_error);

        Self::new(move || {
            let on_error = Arc::clone(&on_error);
            let started = std::panic::catch_unwind(AssertUnwindSafe(|| run()));

            async move {
                let outcome = match started {
                    Ok(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(result) => result.map_err(Into::into),
                        Err(payload) => Err(panic_to_error(payload)),
                    },
                    Err(payload) => Err(panic_to_error(payload)),
                };

                outcome.map_err(|e| on_error(e))
            }
        })
    }

    /// 항상 성공하는 Task
    pub fn of(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::new(move || futures::future::ready(Ok(value.clone())))
    }

    /// 항상 실패하는 Task
    pub fn fail(err: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::new(move || futures::future::ready(Err(err.clone())))
    }

    /// 실행 (호출마다 독립적인 future)
    pub fn run(&self) -> BoxFuture<'static, Result<A, E>> {
        (self.run)()
    }

    /// 성공 값 변환
    pub fn map<B, F>(self, f: F) -> Task<E, B>
    where
        B: Send + 'static,
        F: Fn(A) -> B + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::new(move || {
            let fut = self.run();
            let f = Arc::clone(&f);
            async move { fut.await.map(|a| f(a)) }
        })
    }

    /// 실패 값 변환
    pub fn map_err<E2, F>(self, f: F) -> Task<E2, A>
    where
        E2: Send + 'static,
        F: Fn(E) -> E2 + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::new(move || {
            let fut = self.run();
            let f = Arc::clone(&f);
            async move { fut.await.map_err(|e| f(e)) }
        })
    }

    /// 성공 시 다음 Task로 이어간다 (실패면 그대로 단락)
    pub fn and_then<B, F>(self, f: F) -> Task<E, B>
    where
        B: Send + 'static,
        F: Fn(A) -> Task<E, B> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Task::new(move || {
            let fut = self.run();
            let f = Arc::clone(&f);
            async move {
                let value = fut.await?;
                f(value).run().await
            }
        })
    }
}

fn panic_to_error(payload: Box<dyn Any + Send>) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());

    anyhow::anyhow!("panicked: {}", message)
}
