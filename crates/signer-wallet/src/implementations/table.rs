//! Wallets assembled from closures.
//!
//! [`MethodTable`] adapts signers the crate knows nothing about (an RPC
//! bridge, a hardware wallet, a JS runtime binding) by registering each of
//! their methods under the name and arity the detector looks for.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;

use crate::{ProviderError, WalletMethod, WalletObject};

type MethodFn = dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, ProviderError>> + Send + Sync;

/// A wallet method backed by an async closure with a declared arity.
pub struct FnMethod {
	arity: usize,
	f: Box<MethodFn>,
}

impl FnMethod {
	pub fn new<F, Fut>(arity: usize, f: F) -> Self
	where
		F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<Value, ProviderError>> + Send + 'static,
	{
		Self {
			arity,
			f: Box::new(move |args| f(args).boxed()),
		}
	}
}

#[async_trait]
impl WalletMethod for FnMethod {
	fn arity(&self) -> usize {
		self.arity
	}

	async fn call(&self, args: Vec<Value>) -> Result<Value, ProviderError> {
		(self.f)(args).await
	}
}

/// A wallet object built from named methods.
#[derive(Default)]
pub struct MethodTable {
	methods: HashMap<String, Box<dyn WalletMethod>>,
}

impl MethodTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `method` under `name`, replacing any previous entry.
	pub fn insert(&mut self, name: impl Into<String>, method: impl WalletMethod + 'static) {
		self.methods.insert(name.into(), Box::new(method));
	}

	pub fn with_method(mut self, name: impl Into<String>, method: impl WalletMethod + 'static) -> Self {
		self.insert(name, method);
		self
	}
}

impl WalletObject for MethodTable {
	fn method(&self, name: &str) -> Option<&dyn WalletMethod> {
		self.methods.get(name).map(|method| method.as_ref())
	}
}
