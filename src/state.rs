use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    mailer::Mailer,
    payment::GatewayClient,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
    pub mailer: Mailer,
    pub gateway: GatewayClient,
}
