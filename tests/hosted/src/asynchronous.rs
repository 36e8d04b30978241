use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::marker::Send;

#[async_trait]
pub trait MapAsync<Item: Send>: Iterator<Item = Item> + Sized {
    async fn map_async<
        Ret: std::fmt::Debug + Send,
        Fut: futures::Future<Output = Result<Ret>> + Send,
        F: Fn(Item) -> Fut + Send,
    >(
        self,
        f: F,
    ) -> Result<Vec<Ret>> {
        join_all(self.map(f))
            .await
            .into_iter()
            .collect::<Result<Vec<Ret>>>()
    }
}

impl<Item: Send, Iter: Iterator<Item = Item> + Sized> MapAsync<Item> for Iter {}
