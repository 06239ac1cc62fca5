use std::sync::Arc;

use kubeclient::resource::{Pod, register_builtin};
use kubeclient::{Client, ObjectList, Registry, RequestOptions};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let registry = Registry::new();
    register_builtin(&registry).unwrap();

    let client = Client::infer(Arc::new(registry)).unwrap();

    let version = client.version().await.unwrap();
    println!("api server version: {}.{}", version.major, version.minor);

    let mut options = RequestOptions::new().limit(2);
    loop {
        let list = client
            .list::<ObjectList<Pod>>("", &options)
            .await
            .unwrap();
        println!(
            "{:?} {:?}",
            list.metadata.r#continue, list.metadata.resource_version
        );

        for pod in &list.items {
            println!("{}/{}", pod.metadata.namespace, pod.metadata.name);
        }

        match list.metadata.r#continue {
            Some(token) if !token.is_empty() => {
                options = options.continue_token(token);
            }
            _ => break,
        }
    }

    println!("list done");
}
