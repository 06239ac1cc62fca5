use std::sync::Arc;
use std::time::Duration;

use kubeclient::resource::{Pod, register_builtin};
use kubeclient::{Client, Error, ObjectList, Registry, RequestOptions, WatchEvent};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let registry = Registry::new();
    register_builtin(&registry).unwrap();

    let client = Client::infer(Arc::new(registry)).unwrap();
    let namespace = client.namespace().to_string();

    let list = client
        .list::<ObjectList<Pod>>(&namespace, &RequestOptions::default())
        .await
        .unwrap();
    for pod in &list.items {
        println!("existing pod {}/{}", pod.metadata.namespace, pod.metadata.name);
    }
    let mut resource_version = list.metadata.resource_version;

    loop {
        let mut options = RequestOptions::new()
            .timeout(Duration::from_secs(60))
            .bookmarks();
        if let Some(version) = &resource_version {
            options = options.resource_version(version.clone());
        }

        let mut watcher = client.watch::<Pod>(&namespace, options).await.unwrap();
        loop {
            match watcher.next().await {
                Ok(WatchEvent::Added(pod)) => {
                    println!("add pod {}/{}", pod.metadata.namespace, pod.metadata.name);
                }
                Ok(WatchEvent::Modified(pod)) => {
                    println!("modify pod {}/{}", pod.metadata.namespace, pod.metadata.name);
                }
                Ok(WatchEvent::Deleted(pod)) => {
                    println!("delete pod {}/{}", pod.metadata.namespace, pod.metadata.name);
                }
                Ok(WatchEvent::Bookmark(bookmark)) => {
                    println!("bookmark: {}", bookmark.metadata.resource_version);
                }
                Err(Error::WatchEvent(status)) if status.is_gone() => {
                    // history is gone, start over from the current state
                    println!("resource version expired: {}", status.message);
                    watcher.close();
                    resource_version = None;
                    break;
                }
                Err(Error::EndOfStream) | Err(Error::TruncatedStream) => {
                    resource_version = watcher.resource_version().map(ToString::to_string);
                    break;
                }
                Err(err) => {
                    println!("poll next {err:?}");
                    resource_version = watcher.resource_version().map(ToString::to_string);
                    watcher.close();

                    // backoff
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    break;
                }
            }
        }

        println!(
            "watch ended, re-watching pods from {:?}",
            resource_version
        );
    }
}
