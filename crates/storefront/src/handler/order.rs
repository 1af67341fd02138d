use crate::{
    abstract_trait::{chat::DynChatGatewayClient, order::DynOrderGatewayClient},
    domain::{
        requests::{chat::SystemNotifyRequest, order::CreateOrderRequest},
        response::order::{Order, OrderStatus, OrderTransitionResponse},
    },
    service::SessionStore,
};
use shared::errors::ClientError;
use tracing::{info, warn};

/// Chat line announcing a confirmed appointment. `time` may be an HTML
/// `datetime-local` value; its `T` separator is shown as a space.
pub fn schedule_notice(address: &str, time: &str) -> String {
    format!(
        "📅 NOTICE: Admin confirmed the appointment at {} at {}.",
        address.trim(),
        time.trim().replace('T', " ")
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOutcome {
    pub order_id: i64,
    pub status: OrderStatus,
    pub message: Option<String>,
    /// Whether the chat notice went out; the confirmation stands either way.
    pub notified: bool,
}

/// Order mutations started from the storefront and the dashboard.
#[derive(Clone)]
pub struct OrderHandler {
    orders: DynOrderGatewayClient,
    chat: DynChatGatewayClient,
    session: SessionStore,
}

impl OrderHandler {
    pub fn new(
        orders: DynOrderGatewayClient,
        chat: DynChatGatewayClient,
        session: SessionStore,
    ) -> Self {
        Self {
            orders,
            chat,
            session,
        }
    }

    /// Reserves one unit of `car_id` for the logged-in customer.
    pub async fn place_deposit(&self, car_id: i64) -> Result<Order, ClientError> {
        if !self.session.is_authenticated() {
            return Err(ClientError::NotAuthorized(
                "Please log in to place a deposit".into(),
            ));
        }

        let order = self
            .orders
            .create_order(&CreateOrderRequest::deposit(car_id))
            .await?;

        info!("Deposit placed: order {} for car {car_id}", order.id);
        Ok(order)
    }

    pub async fn pay(&self, order_id: i64) -> Result<OrderTransitionResponse, ClientError> {
        self.orders.pay_order(order_id).await
    }

    /// Confirms the appointment, then posts a system notice to the order's chat.
    pub async fn schedule_appointment(
        &self,
        order_id: i64,
        address: &str,
        time: &str,
    ) -> Result<ScheduleOutcome, ClientError> {
        let mut missing = Vec::new();
        if address.trim().is_empty() {
            missing.push("address: Address is required".to_string());
        }
        if time.trim().is_empty() {
            missing.push("time: Appointment time is required".to_string());
        }
        if !missing.is_empty() {
            return Err(ClientError::Validation(missing));
        }

        let confirmed = self.orders.confirm_order(order_id).await?;
        info!("Order {order_id} scheduled for {time} at {address}");

        let notice = SystemNotifyRequest {
            order_id,
            content: schedule_notice(address, time),
        };
        let notified = match self.chat.system_notify(&notice).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Appointment notice for order {order_id} was not delivered: {e}");
                false
            }
        };

        Ok(ScheduleOutcome {
            order_id,
            status: confirmed.status.unwrap_or(OrderStatus::Scheduled),
            message: confirmed.message,
            notified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::order::OrderGatewayClientTrait,
        domain::response::{order::OrderItem, session::Role},
        testing::{ScriptedChat, logged_in},
    };
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingOrders {
        confirmed: Mutex<Vec<i64>>,
        created: Mutex<Vec<CreateOrderRequest>>,
        confirm_error: Option<ClientError>,
    }

    #[async_trait]
    impl OrderGatewayClientTrait for RecordingOrders {
        async fn find_all(&self) -> Result<Vec<Order>, ClientError> {
            Ok(vec![])
        }
        async fn create_order(&self, req: &CreateOrderRequest) -> Result<Order, ClientError> {
            self.created.lock().unwrap().push(req.clone());
            Ok(Order {
                id: 100,
                user_id: 7,
                items: vec![OrderItem {
                    car_model_id: req.items[0].car_id,
                    quantity: 1,
                    unit_price: 0.0,
                }],
                total_amount: 0.0,
                status: OrderStatus::Pending,
            })
        }
        async fn confirm_order(&self, id: i64) -> Result<OrderTransitionResponse, ClientError> {
            if let Some(err) = &self.confirm_error {
                return Err(err.clone());
            }
            self.confirmed.lock().unwrap().push(id);
            Ok(OrderTransitionResponse {
                message: Some("Appointment confirmed".into()),
                status: Some(OrderStatus::Scheduled),
                warning: None,
            })
        }
        async fn pay_order(&self, _id: i64) -> Result<OrderTransitionResponse, ClientError> {
            unimplemented!()
        }
    }

    fn handler(
        orders: RecordingOrders,
        chat: ScriptedChat,
    ) -> (OrderHandler, Arc<RecordingOrders>, Arc<ScriptedChat>) {
        let orders = Arc::new(orders);
        let chat = Arc::new(chat);
        let handler = OrderHandler::new(
            orders.clone(),
            chat.clone(),
            logged_in(1, Role::Admin, "Lan"),
        );
        (handler, orders, chat)
    }

    #[test]
    fn notice_replaces_datetime_separator() {
        assert_eq!(
            schedule_notice("VinFast Long Bien", "2026-10-20T09:30"),
            "📅 NOTICE: Admin confirmed the appointment at VinFast Long Bien at 2026-10-20 09:30."
        );
    }

    #[tokio::test]
    async fn schedule_confirms_then_notifies() {
        let (handler, orders, chat) = handler(RecordingOrders::default(), ScriptedChat::default());

        let outcome = handler
            .schedule_appointment(42, "VinFast Long Bien", "2026-10-20T09:30")
            .await
            .unwrap();

        assert_eq!(outcome.status, OrderStatus::Scheduled);
        assert!(outcome.notified);
        assert_eq!(*orders.confirmed.lock().unwrap(), vec![42]);
        let notified = chat.notified();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].order_id, 42);
        assert!(notified[0].content.contains("2026-10-20 09:30"));
    }

    #[tokio::test]
    async fn notice_failure_does_not_undo_confirmation() {
        let (handler, orders, _) = handler(
            RecordingOrders::default(),
            ScriptedChat::default().failing_notify(),
        );

        let outcome = handler
            .schedule_appointment(42, "Showroom", "2026-10-20T09:30")
            .await
            .unwrap();

        assert!(!outcome.notified);
        assert_eq!(*orders.confirmed.lock().unwrap(), vec![42]);
    }

    #[tokio::test]
    async fn confirm_failure_skips_notice() {
        let (handler, _, chat) = handler(
            RecordingOrders {
                confirm_error: Some(ClientError::from_status(403, "Only admins")),
                ..Default::default()
            },
            ScriptedChat::default(),
        );

        let err = handler
            .schedule_appointment(42, "Showroom", "2026-10-20T09:30")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(403));
        assert!(chat.notified().is_empty());
    }

    #[tokio::test]
    async fn schedule_requires_address_and_time() {
        let (handler, orders, _) = handler(RecordingOrders::default(), ScriptedChat::default());
        let err = handler.schedule_appointment(42, " ", "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(fields) if fields.len() == 2));
        assert!(orders.confirmed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn deposit_creates_single_unit_order() {
        let (handler, orders, _) = handler(RecordingOrders::default(), ScriptedChat::default());

        let order = handler.place_deposit(3).await.unwrap();

        assert_eq!(order.first_car_id(), Some(3));
        let created = orders.created.lock().unwrap();
        assert_eq!(created[0].items[0].quantity, 1);
    }
}
