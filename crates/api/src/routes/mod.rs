//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/register               - Create account (logs in)
//! POST /api/auth/login                  - Login
//! POST /api/auth/logout                 - Logout
//! GET  /api/auth/me                     - Current user
//! POST /api/auth/otp/request            - Issue email verification code
//! POST /api/auth/otp/confirm            - Confirm email verification code
//! POST /api/auth/password               - Change password
//!
//! # Orders & payments
//! POST /api/orders                      - Create order (pending payment)
//! GET  /api/orders                      - List own orders
//! GET  /api/orders/active               - Active services (lazy expiry)
//! GET  /api/orders/{order_ref}          - Fetch one order
//! POST /api/orders/{order_ref}/cancel   - Cancel order
//! POST /api/payments/razorpay/order     - Create gateway order
//! POST /api/payments/razorpay/verify    - Confirm checkout payment
//! POST /api/payments/razorpay/webhook   - Gateway webhook (HMAC-verified)
//!
//! # Verification proxy (quota-metered)
//! POST /api/verify/pan/fetch            ... and the rest; one POST per
//!                                       provider operation, see
//!                                       `verification.rs`
//!
//! # Catalog, coupons, blog
//! GET  /api/pricing                     - Catalog listing
//! GET  /api/pricing/{kind}              - One service (cached)
//! POST /api/coupons/validate            - Validate a coupon code
//! GET  /api/blog                        - Published posts
//! GET  /api/blog/{slug}                 - One published post
//!
//! # Admin (role-gated)
//! GET  /api/admin/orders                - All orders (filters)
//! PATCH /api/admin/orders/{ref}/status  - Force order status
//! GET  /api/admin/orders/stats          - Order statistics
//! CRUD /api/admin/pricing/{kind}        - Catalog management
//! CRUD /api/admin/coupons               - Coupon management
//! CRUD /api/admin/blog                  - Blog management
//! GET  /api/admin/analytics/*           - Revenue/signup/service analytics
//! ```

pub mod analytics;
pub mod auth;
pub mod blog;
pub mod coupons;
pub mod orders;
pub mod payments;
pub mod pricing;
pub mod users;
pub mod verification;

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router (strict rate limit).
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/profile", patch(auth::update_profile))
        .route("/otp/request", post(auth::request_otp))
        .route("/otp/confirm", post(auth::confirm_otp))
        .route("/password", post(auth::change_password))
        .layer(auth_rate_limiter())
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create_order).get(orders::list_orders))
        .route("/active", get(orders::active_services))
        .route("/{order_ref}", get(orders::get_order))
        .route("/{order_ref}/cancel", post(orders::cancel_order))
}

/// Create the payment routes router.
///
/// The webhook is NOT rate limited: deliveries come from the gateway's
/// infrastructure and are authenticated by signature instead.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/razorpay/order", post(payments::start_payment))
        .route("/razorpay/verify", post(payments::verify_payment))
        .route("/razorpay/webhook", post(payments::webhook))
}

/// Create the verification proxy router.
pub fn verification_routes() -> Router<AppState> {
    Router::new()
        // PAN
        .route("/pan/fetch", post(verification::pan_fetch))
        .route("/pan/father-name", post(verification::pan_father_name))
        // Aadhaar
        .route(
            "/aadhaar/generate-otp",
            post(verification::aadhaar_generate_otp),
        )
        .route("/aadhaar/submit-otp", post(verification::aadhaar_submit_otp))
        .route("/aadhaar/ocr", post(verification::aadhaar_ocr))
        // GSTIN
        .route("/gstin/fetch", post(verification::gstin_fetch))
        .route("/gstin/fetch-by-pan", post(verification::gstin_fetch_by_pan))
        .route(
            "/gstin/contact-details",
            post(verification::gstin_contact_details),
        )
        // MCA
        .route("/mca/cin-by-pan", post(verification::mca_cin_by_pan))
        .route("/mca/din-by-pan", post(verification::mca_din_by_pan))
        // EPFO
        .route("/epfo/fetch-uan", post(verification::epfo_fetch_uan))
        .route("/epfo/passbook", post(verification::epfo_passbook))
        // Voter ID
        .route("/voter/fetch", post(verification::voter_fetch))
        // Passport
        .route("/passport/fetch", post(verification::passport_fetch))
        .route("/passport/verify", post(verification::passport_verify))
        // Vehicle RC + challans
        .route("/rc/fetch-lite", post(verification::rc_fetch_lite))
        .route("/rc/fetch-detailed", post(verification::rc_fetch_detailed))
        .route(
            "/rc/fetch-detailed-challan",
            post(verification::rc_fetch_detailed_challan),
        )
        .route("/challan/fetch", post(verification::challan_fetch))
        // Driving licence
        .route("/dl/fetch", post(verification::dl_fetch))
        // Bank account
        .route("/bank/verify", post(verification::bank_verify))
        // CCRV
        .route(
            "/ccrv/generate-report",
            post(verification::ccrv_generate_report),
        )
        .route("/ccrv/result", post(verification::ccrv_result))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(users::list_users))
        .route("/users/{id}/active", patch(users::set_user_active))
        // Orders
        .route("/orders", get(orders::admin_list_orders))
        .route("/orders/stats", get(orders::admin_order_stats))
        .route("/orders/{order_ref}/status", patch(orders::admin_update_status))
        // Pricing catalog
        .route(
            "/pricing/{kind}",
            put(pricing::upsert_pricing).delete(pricing::delete_pricing),
        )
        // Coupons
        .route(
            "/coupons",
            get(coupons::list_coupons).post(coupons::create_coupon),
        )
        .route("/coupons/{id}", delete(coupons::delete_coupon))
        .route("/coupons/{id}/active", patch(coupons::set_coupon_active))
        .route("/coupons/{id}/redemptions", get(coupons::list_redemptions))
        // Blog
        .route("/blog", get(blog::admin_list_posts).post(blog::create_post))
        .route(
            "/blog/{slug}",
            put(blog::update_post).delete(blog::delete_post),
        )
        // Analytics
        .route("/analytics/revenue", get(analytics::revenue))
        .route("/analytics/orders", get(analytics::order_breakdown))
        .route("/analytics/signups", get(analytics::signups))
        .route("/analytics/top-services", get(analytics::top_services))
}

/// Create all routes for the API.
///
/// Auth carries its own strict limiter; payments stay unlimited (the
/// webhook authenticates by signature and gateway retries must not be
/// throttled); everything else shares the relaxed API limiter.
pub fn routes() -> Router<AppState> {
    let public = Router::new()
        .route("/pricing", get(pricing::list_pricing))
        .route("/pricing/{kind}", get(pricing::get_pricing))
        .route("/coupons/validate", post(coupons::validate_coupon))
        .route("/blog", get(blog::list_posts))
        .route("/blog/{slug}", get(blog::get_post));

    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes().layer(api_rate_limiter()))
        .nest("/payments", payment_routes())
        .nest("/verify", verification_routes().layer(api_rate_limiter()))
        .nest("/admin", admin_routes().layer(api_rate_limiter()))
        .merge(public.layer(api_rate_limiter()));

    Router::new().nest("/api", api)
}
