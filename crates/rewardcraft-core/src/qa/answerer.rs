use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Anything that can turn a question into an answer string, typically a
/// search-augmented language model.
#[async_trait]
pub trait Answerer: Send + Sync {
	async fn ask(&self, question: &str) -> Result<String>;
}

#[async_trait]
impl<A: Answerer + ?Sized> Answerer for Arc<A> {
	async fn ask(&self, question: &str) -> Result<String> {
		(**self).ask(question).await
	}
}

/// Wrap an async closure as an `Answerer`.
pub fn from_async_fn<F, Fut>(f: F) -> Arc<dyn Answerer>
where
	F: Send + Sync + 'static + Fn(String) -> Fut,
	Fut: Future<Output = Result<String>> + Send + 'static,
{
	struct ClosureAnswerer<F, Fut>
	where
		F: Send + Sync + 'static + Fn(String) -> Fut,
		Fut: Future<Output = Result<String>> + Send + 'static,
	{
		f: F,
		_fut: PhantomData<fn() -> Fut>,
	}

	#[async_trait]
	impl<F, Fut> Answerer for ClosureAnswerer<F, Fut>
	where
		F: Send + Sync + 'static + Fn(String) -> Fut,
		Fut: Future<Output = Result<String>> + Send + 'static,
	{
		async fn ask(&self, question: &str) -> Result<String> {
			(self.f)(question.to_string()).await
		}
	}

	Arc::new(ClosureAnswerer { f, _fut: PhantomData })
}
