use std::time::Duration;

use actix_web::{
    dev::Server,
    error::InternalError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpServer,
    ResponseError,
};
use fee_payment_engine::{
    notifier::SmtpNotifier,
    receipts::PdfReceiptRenderer,
    traits::PaymentStore,
    FulfillmentApi,
    PaymentsApi,
    ReferenceLocks,
    SqliteDatabase,
};
use log::*;
use paystack_tools::PaystackApi;

use crate::{
    auth::{ReceiptLinkSigner, TokenIssuer},
    config::{ServerConfig, ServerOptions},
    data_objects::ReceiptDirectory,
    errors::ServerError,
    reconcile_worker::start_reconcile_worker,
    routes::{
        admin_login,
        health,
        logout,
        receipt,
        thank_you,
        DashboardRoute,
        SavePaymentRoute,
        StalledFulfillmentsRoute,
        VerifyPaymentRoute,
    },
};

/// The concrete backends the server runs with.
pub type ServerFulfillmentApi = FulfillmentApi<SqliteDatabase, PaystackApi, PdfReceiptRenderer, SmtpNotifier>;

/// Everything that handlers share across workers, built once at start-up.
#[derive(Clone)]
pub struct Backends {
    pub db: SqliteDatabase,
    pub gateway: PaystackApi,
    pub renderer: PdfReceiptRenderer,
    pub notifier: SmtpNotifier,
    pub locks: ReferenceLocks,
}

impl Backends {
    pub fn fulfillment_api(&self) -> ServerFulfillmentApi {
        FulfillmentApi::new(
            self.db.clone(),
            self.gateway.clone(),
            self.renderer.clone(),
            self.notifier.clone(),
            self.locks.clone(),
        )
    }
}

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.initialize().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = PaystackApi::new(config.paystack.clone())
        .map_err(|e| ServerError::ConfigurationError(format!("Could not create the Paystack client. {e}")))?;
    let renderer = PdfReceiptRenderer::new(&config.receipt_dir);
    let notifier = SmtpNotifier::new(&config.mailer)
        .map_err(|e| ServerError::ConfigurationError(format!("Could not configure the SMTP relay. {e}")))?;
    let backends = Backends { db, gateway, renderer, notifier, locks: ReferenceLocks::new() };
    let _worker = start_reconcile_worker(
        backends.fulfillment_api(),
        config.reconcile_interval,
        config.reconcile_max_attempts,
    );
    let srv = create_server_instance(config, backends)?;
    srv.await.map_err(|e| ServerError::BackendError(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, backends: Backends) -> Result<Server, ServerError> {
    let token_issuer = TokenIssuer::new(&config.auth);
    let link_signer = ReceiptLinkSigner::new(&config.auth);
    let options = ServerOptions::from_config(&config);
    let receipt_dir = ReceiptDirectory::new(config.receipt_dir.clone());
    let admin = config.admin.clone();
    let srv = HttpServer::new(move || {
        let fulfillment_api = backends.fulfillment_api();
        let payments_api = PaymentsApi::new(backends.db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fee::access_log"))
            .app_data(json_config())
            .app_data(form_config())
            .app_data(web::Data::new(fulfillment_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(token_issuer.clone()))
            .app_data(web::Data::new(link_signer.clone()))
            .app_data(web::Data::new(admin.clone()))
            .app_data(web::Data::new(options))
            .app_data(web::Data::new(receipt_dir.clone()))
            .service(health)
            .service(admin_login)
            .service(logout)
            .service(thank_you)
            .service(receipt)
            .service(SavePaymentRoute::<SqliteDatabase>::new())
            .service(VerifyPaymentRoute::<SqliteDatabase, PaystackApi, PdfReceiptRenderer, SmtpNotifier>::new())
            .service(DashboardRoute::<SqliteDatabase>::new())
            .service(StalledFulfillmentsRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    info!("💻️ Listening on {}:{}", config.host, config.port);
    Ok(srv)
}

/// Malformed JSON bodies get the same `{"error": ...}` shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejected JSON body. {err}");
        let response = ServerError::InvalidRequestBody(err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}

pub fn form_config() -> web::FormConfig {
    web::FormConfig::default().error_handler(|err, _req| {
        debug!("💻️ Rejected form body. {err}");
        let response = ServerError::InvalidRequestBody(err.to_string()).error_response();
        InternalError::from_response(err, response).into()
    })
}
