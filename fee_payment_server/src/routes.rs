//! Request handler definitions
//!
//! Define each route and its handler here. Handlers that grow beyond a few lines of glue belong in the engine, not
//! here. Every handler is async; blocking work (PDF rendering, file I/O) is pushed onto the blocking pool or done
//! with async I/O, so that a worker thread is never stalled.
use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse, Responder};
use fee_payment_engine::{
    receipts::reference_from_file_name,
    traits::{FulfillmentStore, PaymentVerifier, ReceiptNotifier, ReceiptRenderer},
    FulfillmentApi,
    InsertPaymentResult,
    PaymentsApi,
};
use log::*;
use serde_json::json;

use crate::{
    auth::{AdminClaims, ReceiptLinkSigner, TokenIssuer},
    config::{AdminCredentials, ServerOptions},
    data_objects::{
        JsonResponse,
        LoginParams,
        LoginResponse,
        ReceiptDirectory,
        ReceiptLinkParams,
        SavePaymentParams,
        ThankYouParams,
        VerifyPaymentParams,
        VerifyPaymentResponse,
    },
    errors::{AuthError, ServerError},
    helpers::{access_cookie, access_token, expired_access_cookie},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires admin)  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AdminAuthMiddlewareFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Admin auth  ------------------------------------------------
/// Exchanges the administrator's username and password (form-encoded) for an access token.
///
/// The token is returned in the body and set as the `fee_access_token` cookie, so that both browsers and scripts
/// can use it.
#[post("/admin")]
pub async fn admin_login(
    form: web::Form<LoginParams>,
    issuer: web::Data<TokenIssuer>,
    admin: web::Data<AdminCredentials>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received admin login request");
    let LoginParams { username, password } = form.into_inner();
    let (token, claims) = issuer.login(&admin, &username, &password)?;
    let expires_at = claims.expires_at().ok_or_else(|| AuthError::SigningError("Invalid expiry time".into()))?;
    let cookie = access_cookie(&token, issuer.ttl());
    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse { token, expires_at }))
}

#[get("/logout")]
pub async fn logout() -> impl Responder {
    trace!("💻️ Received logout request");
    HttpResponse::Ok().cookie(expired_access_cookie()).json(JsonResponse::success("Logged out"))
}

//----------------------------------------------   Dashboard  -------------------------------------------------
route!(dashboard => Get "/dashboard" impl FulfillmentStore where requires admin);
/// All payment records, newest first.
pub async fn dashboard<B: FulfillmentStore>(
    claims: web::ReqData<AdminClaims>,
    api: web::Data<PaymentsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ Dashboard requested by {}", claims.username);
    let payments = api.payments().await?;
    Ok(HttpResponse::Ok().json(payments))
}

route!(stalled_fulfillments => Get "/api/fulfillments/stalled" impl FulfillmentStore where requires admin);
/// Fulfillments that stopped before the receipt was emailed, and that the reconciliation worker will still retry.
pub async fn stalled_fulfillments<B: FulfillmentStore>(
    api: web::Data<PaymentsApi<B>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received stalled fulfillments request");
    let stalled = api.stalled_fulfillments(options.reconcile_max_attempts).await?;
    Ok(HttpResponse::Ok().json(stalled))
}

//----------------------------------------------   Payments  --------------------------------------------------
#[get("/thank_you")]
pub async fn thank_you(query: web::Query<ThankYouParams>) -> impl Responder {
    let student_id = query.into_inner().student_id;
    HttpResponse::Ok().json(json!({ "message": "Thank you for your payment!", "student_id": student_id }))
}

route!(save_payment => Post "/save_payment" impl FulfillmentStore);
/// Stores a payment that the client reports itself. The status is NOT checked with the gateway.
pub async fn save_payment<B: FulfillmentStore>(
    body: web::Json<SavePaymentParams>,
    api: web::Data<PaymentsApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = body.into_inner();
    if params.reference.trim().is_empty() {
        return Err(ServerError::MissingReference);
    }
    trace!("💻️ Received save_payment request for [{}]", params.reference);
    match api.save_payment(params.into()).await? {
        InsertPaymentResult::Inserted(record) => {
            Ok(HttpResponse::Ok().json(json!({ "message": "Payment saved", "id": record.id })))
        },
        InsertPaymentResult::AlreadyExists(record) => Err(ServerError::DuplicatePayment(record.reference)),
    }
}

route!(verify_payment => Post "/verify_payment" impl FulfillmentStore, PaymentVerifier, ReceiptRenderer, ReceiptNotifier);
/// Confirms a reference with the gateway, records the payment, and emails the receipt. The response carries a signed
/// link to the receipt.
pub async fn verify_payment<B, G, R, N>(
    body: web::Json<VerifyPaymentParams>,
    api: web::Data<FulfillmentApi<B, G, R, N>>,
    signer: web::Data<ReceiptLinkSigner>,
) -> Result<HttpResponse, ServerError>
where
    B: FulfillmentStore,
    G: PaymentVerifier,
    R: ReceiptRenderer,
    N: ReceiptNotifier,
{
    let request = body.into_inner().into_request().ok_or(ServerError::MissingReference)?;
    debug!("💻️ Received verify_payment request for [{}]", request.reference);
    let outcome = api.fulfil(request).await.map_err(|e| {
        if e.payment_recorded() {
            warn!("💻️ {e}");
        }
        ServerError::from(e)
    })?;
    let receipt_url = signer.signed_url(&outcome.receipt().file_name)?;
    let record = outcome.record();
    let message = if outcome.newly_fulfilled() {
        "Payment verified. Your receipt has been emailed to you."
    } else {
        "This payment was already verified. Your receipt was emailed to you previously."
    };
    Ok(HttpResponse::Ok().json(VerifyPaymentResponse {
        status: "success".to_string(),
        message: message.to_string(),
        reference: record.reference.clone(),
        amount: record.amount,
        receipt_url,
    }))
}

//----------------------------------------------   Receipts  --------------------------------------------------
/// Serves a receipt PDF to the holder of a signed link, or to an administrator.
#[get("/receipts/{filename}")]
pub async fn receipt(
    req: HttpRequest,
    path: web::Path<String>,
    query: web::Query<ReceiptLinkParams>,
    signer: web::Data<ReceiptLinkSigner>,
    issuer: web::Data<TokenIssuer>,
    dir: web::Data<ReceiptDirectory>,
) -> Result<HttpResponse, ServerError> {
    let file_name = path.into_inner();
    if reference_from_file_name(&file_name).is_none() {
        debug!("💻️ Refused to serve '{file_name}'. It is not a receipt name.");
        return Err(ServerError::NoRecordFound(file_name));
    }
    let link_ok = match (query.expires, query.signature.as_deref()) {
        (Some(expires), Some(signature)) => match signer.verify(&file_name, expires, signature) {
            Ok(()) => true,
            Err(e) => {
                debug!("💻️ Receipt link for {file_name} rejected. {e}");
                false
            },
        },
        _ => false,
    };
    let admin_ok = !link_ok && access_token(&req).map(|t| issuer.validate(&t).is_ok()).unwrap_or(false);
    if !(link_ok || admin_ok) {
        return Err(ServerError::InsufficientPermissions(format!("No valid signature or access token for {file_name}")));
    }
    let bytes = tokio::fs::read(dir.path().join(&file_name)).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ServerError::NoRecordFound(file_name.clone()),
        _ => ServerError::IOError(e),
    })?;
    trace!("💻️ Serving {file_name} ({} bytes)", bytes.len());
    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(header::ContentDisposition {
            disposition: header::DispositionType::Inline,
            parameters: vec![header::DispositionParam::Filename(file_name)],
        })
        .body(bytes))
}
