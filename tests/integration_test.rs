use order_saga::config::OrchestratorConfig;
use order_saga::lifecycle::OrderSystem;
use order_saga::wire::{self, FlatObject};
use reqwest::Client;
use tokio::net::TcpListener;

/// All three services on ephemeral ports, talking to each other over HTTP.
struct TestSystem {
    system: OrderSystem,
    client: Client,
    user_url: String,
    product_url: String,
    order_url: String,
}

impl TestSystem {
    async fn start(settings: OrchestratorConfig) -> Self {
        let user = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let product = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let order = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let system = OrderSystem::start(settings, user, product, order).expect("Failed to start");

        Self {
            user_url: format!("http://{}/user", system.user_addr.unwrap()),
            product_url: format!("http://{}/product", system.product_addr.unwrap()),
            order_url: format!("http://{}/order", system.order_addr.unwrap()),
            system,
            client: Client::new(),
        }
    }

    async fn post(&self, url: &str, body: &str) -> (u16, String) {
        post(&self.client, url, body).await
    }

    async fn get(&self, url: String) -> (u16, String) {
        let response = self.client.get(url).send().await.expect("Request failed");
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }

    async fn order(&self, user_id: i64, product_id: i64, quantity: i64) -> (u16, String) {
        self.post(&self.order_url, &order_body(user_id, product_id, quantity))
            .await
    }

    /// Fires `count` single-unit orders for product 7 at once.
    async fn concurrent_orders(&self, count: usize) -> Vec<(u16, String)> {
        let mut handles = vec![];
        for _ in 0..count {
            let client = self.client.clone();
            let url = self.order_url.clone();
            handles.push(tokio::spawn(async move {
                post(&client, &url, &order_body(1, 7, 1)).await
            }));
        }
        let mut results = vec![];
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }

    async fn product(&self, id: i64) -> FlatObject {
        let (status, body) = self.get(format!("{}/{id}", self.product_url)).await;
        assert_eq!(status, 200);
        wire::decode(body.as_bytes()).unwrap()
    }

    async fn seed(&self, product_quantity: i64) {
        let (status, _) = self
            .post(
                &self.user_url,
                r#"{"command":"create","id":1,"username":"ada","email":"ada@example.com","password":"secret"}"#,
            )
            .await;
        assert_eq!(status, 200);
        let (status, _) = self
            .post(
                &self.product_url,
                &format!(
                    r#"{{"command":"create","id":7,"name":"lamp","description":"desk lamp","price":9.5,"quantity":{product_quantity}}}"#
                ),
            )
            .await;
        assert_eq!(status, 200);
    }

    async fn shutdown(self) {
        drop(self.client);
        self.system.shutdown().await.expect("Shutdown failed");
    }
}

async fn post(client: &Client, url: &str, body: &str) -> (u16, String) {
    let response = client
        .post(url)
        .header("content-type", "application/json")
        .body(body.to_string())
        .send()
        .await
        .expect("Request failed");
    let status = response.status().as_u16();
    (status, response.text().await.unwrap())
}

fn order_body(user_id: i64, product_id: i64, quantity: i64) -> String {
    format!(
        r#"{{"command":"place order","user_id":{user_id},"product_id":{product_id},"quantity":{quantity}}}"#
    )
}

fn stock(product: &FlatObject) -> (i64, String) {
    (
        product.parse("quantity").unwrap(),
        product.get_str("token").unwrap().into_owned(),
    )
}

#[tokio::test]
async fn test_order_decrements_stock_and_advances_token() {
    let system = TestSystem::start(OrchestratorConfig::default()).await;
    system.seed(5).await;
    assert_eq!(stock(&system.product(7).await), (5, "t0".to_string()));

    let (status, body) = system.order(1, 7, 3).await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        r#"{"product_id":7,"user_id":1,"quantity":3,"status":"Success"}"#
    );
    assert_eq!(stock(&system.product(7).await), (2, "t1".to_string()));
    system.shutdown().await;
}

#[tokio::test]
async fn test_order_above_stock_is_refused() {
    let system = TestSystem::start(OrchestratorConfig::default()).await;
    system.seed(5).await;

    let (status, body) = system.order(1, 7, 10).await;

    assert_eq!(status, 409);
    assert_eq!(body, r#"{"status":"Exceeded quantity limit"}"#);
    assert_eq!(stock(&system.product(7).await), (5, "t0".to_string()));
    system.shutdown().await;
}

#[tokio::test]
async fn test_invalid_and_unknown_orders() {
    let system = TestSystem::start(OrchestratorConfig::default()).await;
    system.seed(5).await;

    for body in [
        r#"{"command":"place order","user_id":1,"product_id":7,"quantity":0}"#,
        r#"{"command":"place order","user_id":1,"product_id":7,"quantity":"x"}"#,
        r#"{"command":"place order","user_id":1}"#,
        r#"not json"#,
    ] {
        let (status, reply) = system.post(&system.order_url, body).await;
        assert_eq!(status, 400, "body {body}");
        assert_eq!(reply, r#"{"status":"Invalid Request"}"#);
    }

    let (status, reply) = system.order(2, 7, 1).await;
    assert_eq!(status, 404);
    assert_eq!(reply, r#"{"status":"Invalid Request"}"#);

    let (status, _) = system.order(1, 8, 1).await;
    assert_eq!(status, 404);

    assert_eq!(stock(&system.product(7).await), (5, "t0".to_string()));
    system.shutdown().await;
}

#[tokio::test]
async fn test_replayed_reserve_never_decrements_twice() {
    let system = TestSystem::start(OrchestratorConfig::default()).await;
    system.seed(5).await;
    let reserve = r#"{"command":"reserve","id":7,"delta":-2,"expected_token":"t0"}"#;

    let (status, body) = system.post(&system.product_url, reserve).await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"id":7,"quantity":3,"token":"t1"}"#);

    let (status, body) = system.post(&system.product_url, reserve).await;
    assert_eq!(status, 409);
    assert_eq!(
        body,
        r#"{"status":"Conflict","id":7,"quantity":3,"token":"t1"}"#
    );

    assert_eq!(stock(&system.product(7).await), (3, "t1".to_string()));
    system.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_sell_exactly_the_stock() {
    const STOCK: i64 = 5;
    const ORDERS: usize = 20;

    // Each conflict means another order went through, so STOCK + 1 attempts always suffice.
    let settings = OrchestratorConfig {
        max_attempts: STOCK as u32 + 1,
        ..OrchestratorConfig::default()
    };
    let system = TestSystem::start(settings).await;
    system.seed(STOCK).await;

    let results = system.concurrent_orders(ORDERS).await;

    let successes = results.iter().filter(|(status, _)| *status == 200).count();
    let refused = results
        .iter()
        .filter(|(status, body)| *status == 409 && body.contains("Exceeded quantity limit"))
        .count();
    assert_eq!(successes, STOCK as usize);
    assert_eq!(refused, ORDERS - STOCK as usize);
    assert_eq!(
        stock(&system.product(7).await),
        (0, format!("t{STOCK}"))
    );
    system.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_with_default_retries_never_oversell() {
    const STOCK: i64 = 3;
    const ORDERS: usize = 12;

    let system = TestSystem::start(OrchestratorConfig::default()).await;
    system.seed(STOCK).await;

    let results = system.concurrent_orders(ORDERS).await;

    let successes = results.iter().filter(|(status, _)| *status == 200).count() as i64;
    assert!(successes <= STOCK);
    assert!(results
        .iter()
        .all(|(status, _)| *status == 200 || *status == 409));
    let (quantity, _) = stock(&system.product(7).await);
    assert_eq!(quantity, STOCK - successes);
    assert!(quantity >= 0);
    system.shutdown().await;
}

#[tokio::test]
async fn test_collaborator_conflicts_and_mismatches() {
    let system = TestSystem::start(OrchestratorConfig::default()).await;
    system.seed(5).await;

    let (status, _) = system
        .post(
            &system.user_url,
            r#"{"command":"create","id":1,"username":"bob","email":"bob@example.com","password":"pw"}"#,
        )
        .await;
    assert_eq!(status, 409);

    let (status, _) = system
        .post(
            &system.user_url,
            r#"{"command":"delete","id":1,"username":"ada","email":"ada@example.com","password":"wrong"}"#,
        )
        .await;
    assert_eq!(status, 404);

    let (status, body) = system.get(format!("{}/1", system.user_url)).await;
    assert_eq!(status, 200);
    assert!(body.contains(r#""username":"ada""#));

    let (status, _) = system.get(format!("{}/abc", system.user_url)).await;
    assert_eq!(status, 400);

    let (status, _) = system
        .post(
            &system.product_url,
            r#"{"command":"create","id":7,"name":"lamp","description":"other","price":1.0,"quantity":1}"#,
        )
        .await;
    assert_eq!(status, 409);

    let (status, _) = system
        .post(&system.product_url, r#"{"command":"update","id":7,"price":12.0}"#)
        .await;
    assert_eq!(status, 200);
    assert_eq!(stock(&system.product(7).await), (5, "t1".to_string()));

    system.shutdown().await;
}

#[tokio::test]
async fn test_responses_are_json() {
    let system = TestSystem::start(OrchestratorConfig::default()).await;

    let response = system
        .client
        .post(&system.order_url)
        .body(r#"{"command":"place order"}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    drop(response);
    system.shutdown().await;
}
