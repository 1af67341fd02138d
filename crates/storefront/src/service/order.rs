use crate::{
    abstract_trait::order::OrderGatewayClientTrait,
    domain::{
        requests::order::CreateOrderRequest,
        response::order::{Order, OrderResponse, OrderTransitionResponse},
    },
    service::GatewayHttp,
};
use async_trait::async_trait;
use serde_json::Value;
use shared::errors::ClientError;
use tracing::{info, warn};
use validator::Validate;

const ORDERS_PATH: &str = "/orders/api/v1/orders";

#[derive(Debug, Clone)]
pub struct OrderGatewayClientService {
    http: GatewayHttp,
}

impl OrderGatewayClientService {
    pub fn new(http: &GatewayHttp) -> Self {
        Self {
            http: http.for_component("order-service-client"),
        }
    }
}

#[async_trait]
impl OrderGatewayClientTrait for OrderGatewayClientService {
    async fn find_all(&self) -> Result<Vec<Order>, ClientError> {
        let raw: Vec<Value> = self.http.get("FindAllOrders", ORDERS_PATH).await?;

        // one malformed record must not blank the whole table
        let orders = raw
            .into_iter()
            .enumerate()
            .filter_map(|(idx, value)| {
                match serde_json::from_value::<OrderResponse>(value)
                    .map_err(ClientError::from)
                    .and_then(Order::try_from)
                {
                    Ok(order) => Some(order),
                    Err(e) => {
                        warn!("Skipping order #{idx} in listing: {e}");
                        None
                    }
                }
            })
            .collect();

        Ok(orders)
    }

    async fn create_order(&self, req: &CreateOrderRequest) -> Result<Order, ClientError> {
        req.validate()?;
        info!("Creating order with {} item(s)", req.items.len());

        let order: OrderResponse = self.http.post("CreateOrder", ORDERS_PATH, req).await?;

        Order::try_from(order)
    }

    async fn confirm_order(&self, id: i64) -> Result<OrderTransitionResponse, ClientError> {
        info!("Confirming order {id}");

        let response: OrderTransitionResponse = self
            .http
            .put_empty("ConfirmOrder", &format!("{ORDERS_PATH}/{id}/confirm"))
            .await?;

        if let Some(warning) = &response.warning {
            warn!("Order {id} confirmed with warning: {warning}");
        }

        Ok(response)
    }

    async fn pay_order(&self, id: i64) -> Result<OrderTransitionResponse, ClientError> {
        info!("Paying order {id}");

        self.http
            .put_empty("PayOrder", &format!("{ORDERS_PATH}/{id}/pay"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::response::order::OrderStatus, service::test_support};
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path},
    };

    #[tokio::test]
    async fn lists_orders_with_mixed_key_styles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/api/v1/orders"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 42, "user_id": 7, "total_amount": 1_000_000_000.0, "status": "Paid",
                 "items": [{"car_model_id": 3, "quantity": 1, "unit_price": 1_000_000_000.0}]},
                {"_id": "43", "user_id": 8, "status": "Shipping",
                 "items": [{"car_id": 4, "quantity": 2, "unit_price": 10.0}]}
            ])))
            .mount(&server)
            .await;

        let (http, _) = test_support::http(&server.uri(), Some("t"));
        let orders = OrderGatewayClientService::new(&http)
            .find_all()
            .await
            .unwrap();

        assert_eq!(orders[0].id, 42);
        assert_eq!(orders[0].status, OrderStatus::Paid);
        assert_eq!(orders[1].id, 43);
        assert_eq!(orders[1].first_car_id(), Some(4));
        assert_eq!(orders[1].total_amount, 20.0);
        assert_eq!(
            orders[1].status,
            OrderStatus::Unrecognized("Shipping".into())
        );
    }

    #[tokio::test]
    async fn invalid_orders_are_skipped_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/api/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"status": "Paid"},
                {"id": 7, "user_id": 1, "status": "Pending",
                 "items": [{"car_id": 2, "quantity": 0}]},
                {"id": "x-1", "status": "Paid"},
                {"id": 8, "user_id": 1, "total_amount": 5.0, "status": "Paid", "items": []}
            ])))
            .mount(&server)
            .await;

        let (http, _) = test_support::http(&server.uri(), Some("t"));
        let orders = OrderGatewayClientService::new(&http)
            .find_all()
            .await
            .unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, 8);
    }

    #[tokio::test]
    async fn non_list_body_is_still_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders/api/v1/orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "oops"})))
            .mount(&server)
            .await;

        let (http, _) = test_support::http(&server.uri(), Some("t"));
        let err = OrderGatewayClientService::new(&http)
            .find_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn create_posts_items_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders/api/v1/orders"))
            .and(body_json(json!({"items": [{"car_id": 3, "quantity": 1}]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 50, "user_id": 7, "total_amount": 1.0, "status": "Pending",
                "items": [{"car_model_id": 3, "quantity": 1, "unit_price": 1.0}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (http, _) = test_support::http(&server.uri(), Some("t"));
        let order = OrderGatewayClientService::new(&http)
            .create_order(&CreateOrderRequest::deposit(3))
            .await
            .unwrap();

        assert_eq!(order.id, 50);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn confirm_forbidden_keeps_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/orders/api/v1/orders/42/confirm"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(json!({"message": "Only admins can confirm"})),
            )
            .mount(&server)
            .await;

        let (http, _) = test_support::http(&server.uri(), Some("t"));
        let err = OrderGatewayClientService::new(&http)
            .confirm_order(42)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert_eq!(err.user_message(), "Only admins can confirm");
    }

    #[tokio::test]
    async fn pay_returns_new_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/orders/api/v1/orders/42/pay"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Payment successful", "status": "Paid"
            })))
            .mount(&server)
            .await;

        let (http, _) = test_support::http(&server.uri(), Some("t"));
        let res = OrderGatewayClientService::new(&http)
            .pay_order(42)
            .await
            .unwrap();
        assert_eq!(res.status, Some(OrderStatus::Paid));
    }
}
