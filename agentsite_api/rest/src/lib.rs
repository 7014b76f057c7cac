use std::net::IpAddr;

use agentsite_core_contact_contracts::ContactFeatureService;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

mod errors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Contact> {
    contact: Contact,
}

impl<Contact> RestServer<Contact>
where
    Contact: ContactFeatureService,
{
    pub fn new(contact: Contact) -> Self {
        Self { contact }
    }

    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind((host, port)).await?;
        info!("listening on {}", listener.local_addr()?);
        axum::serve(listener, router).await.map_err(Into::into)
    }

    pub fn router(self) -> Router<()> {
        let router = Router::new().merge(routes::contact::router(self.contact.into()));

        let router = middlewares::panic_handler::add(router);
        let router = middlewares::trace::add(router);
        middlewares::request_id::add(router)
    }
}
