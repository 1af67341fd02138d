use crate::{
    abstract_trait::{
        catalog::DynCatalogGatewayClient, chat::DynChatGatewayClient,
        order::DynOrderGatewayClient, session::DynSessionStorage, user::DynUserGatewayClient,
    },
    aggregator::OrderViewAggregator,
    config::RoleSource,
    handler::{OrderHandler, ProfileHandler},
    service::{
        CatalogGatewayClientService, ChatGatewayClientService, GatewayHttp,
        OrderGatewayClientService, SessionStore, UserGatewayClientService,
    },
};
use shared::abstract_trait::DynJwtService;
use std::sync::Arc;

#[derive(Clone)]
pub struct DependenciesInject {
    pub user_clients: DynUserGatewayClient,
    pub catalog_clients: DynCatalogGatewayClient,
    pub order_clients: DynOrderGatewayClient,
    pub chat_clients: DynChatGatewayClient,
    pub session: SessionStore,
    pub aggregator: OrderViewAggregator,
    pub order_handler: OrderHandler,
    pub profile_handler: ProfileHandler,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("user_clients", &"DynUserGatewayClient")
            .field("catalog_clients", &"DynCatalogGatewayClient")
            .field("order_clients", &"DynOrderGatewayClient")
            .field("chat_clients", &"DynChatGatewayClient")
            .field("session", &self.session)
            .finish()
    }
}

impl DependenciesInject {
    pub fn new(
        http: &GatewayHttp,
        storage: DynSessionStorage,
        jwt: DynJwtService,
        role_source: RoleSource,
    ) -> Self {
        let user_clients: DynUserGatewayClient = Arc::new(UserGatewayClientService::new(http));
        let catalog_clients: DynCatalogGatewayClient =
            Arc::new(CatalogGatewayClientService::new(http));
        let order_clients: DynOrderGatewayClient = Arc::new(OrderGatewayClientService::new(http));
        let chat_clients: DynChatGatewayClient = Arc::new(ChatGatewayClientService::new(http));

        let session = SessionStore::new(storage, user_clients.clone(), jwt, role_source);

        let aggregator = OrderViewAggregator::new(
            order_clients.clone(),
            catalog_clients.clone(),
            user_clients.clone(),
        );

        let order_handler =
            OrderHandler::new(order_clients.clone(), chat_clients.clone(), session.clone());
        let profile_handler = ProfileHandler::new(user_clients.clone(), session.clone());

        Self {
            user_clients,
            catalog_clients,
            order_clients,
            chat_clients,
            session,
            aggregator,
            order_handler,
            profile_handler,
        }
    }
}
