// FieldServe - REST API Server
// Serves the dashboard API: items with computed pricing, customers, jobs,
// quotes, and summary stats.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use fieldserve::{
    get_all_customers, get_all_jobs, get_job_by_number, get_low_stock_items, setup_database,
    Customer, Item, Job, MarkupSchedule,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    schedule: Arc<MarkupSchedule>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Item response with pricing computed through the markup schedule
#[derive(Serialize)]
struct ItemResponse {
    item_code: String,
    name: String,
    item_type: String,
    category: String,
    unit_of_measure: String,
    cost_price: f64,
    sell_price: f64,
    markup_percentage: f64,
    current_stock: f64,
    is_low_stock: bool,
    needs_reorder: bool,
    supplier: String,
}

impl ItemResponse {
    fn from_item(item: &Item, schedule: &MarkupSchedule) -> Self {
        let quote = item.priced_quote(schedule);
        Self {
            item_code: item.item_code.clone(),
            name: item.name.clone(),
            item_type: item.item_type.as_str().to_string(),
            category: item.category.clone(),
            unit_of_measure: item.unit_of_measure.clone(),
            cost_price: quote.cost_price,
            sell_price: quote.sell_price,
            markup_percentage: quote.markup_percentage,
            current_stock: item.current_stock,
            is_low_stock: item.is_low_stock(),
            needs_reorder: item.needs_reorder(),
            supplier: item.supplier.clone(),
        }
    }
}

#[derive(Serialize)]
struct CustomerResponse {
    id: String,
    name: String,
    customer_type: String,
    email: String,
    phone: String,
    address: String,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.clone(),
            name: customer.display_name(),
            customer_type: customer.customer_type.as_str().to_string(),
            email: customer.email,
            phone: customer.phone,
            address: format!(
                "{}, {}, {} {}",
                customer.street_address, customer.city, customer.state, customer.zip_code
            ),
        }
    }
}

#[derive(Serialize)]
struct JobResponse {
    job_number: String,
    title: String,
    customer_id: String,
    status: String,
    priority: String,
    scheduled_date: Option<String>,
    assigned_technician: Option<String>,
    estimated_cost: Option<f64>,
    final_cost: Option<f64>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            job_number: job.job_number,
            title: job.title,
            customer_id: job.customer_id,
            status: job.status.as_str().to_string(),
            priority: job.priority.as_str().to_string(),
            scheduled_date: job.scheduled_date.map(|d| d.to_string()),
            assigned_technician: job.assigned_technician,
            estimated_cost: job.estimated_cost,
            final_cost: job.final_cost,
        }
    }
}

/// Quote response for an ad-hoc cost price
#[derive(Serialize)]
struct QuoteResponse {
    cost_price: f64,
    sell_price: f64,
    markup_percentage: f64,
}

/// Stats response
#[derive(Serialize)]
struct StatsResponse {
    total_customers: usize,
    total_items: usize,
    total_jobs: usize,
    open_jobs: usize,
    low_stock_items: usize,
    stock_value: f64,
    jobs_by_status: Vec<StatusCount>,
}

#[derive(Serialize)]
struct StatusCount {
    status: String,
    count: usize,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/items - Full catalog with computed pricing
async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match fieldserve::get_all_items(&conn) {
        Ok(items) => {
            let response: Vec<ItemResponse> = items
                .iter()
                .map(|item| ItemResponse::from_item(item, &state.schedule))
                .collect();

            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            eprintln!("Error listing items: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Vec::<ItemResponse>::new())),
            )
                .into_response()
        }
    }
}

/// GET /api/items/low-stock - Items at or below minimum stock
async fn list_low_stock(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_low_stock_items(&conn) {
        Ok(items) => {
            let response: Vec<ItemResponse> = items
                .iter()
                .map(|item| ItemResponse::from_item(item, &state.schedule))
                .collect();

            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            eprintln!("Error listing low-stock items: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Vec::<ItemResponse>::new())),
            )
                .into_response()
        }
    }
}

/// GET /api/quote/:cost - Price an ad-hoc cost through the schedule
async fn quote_cost(
    State(state): State<AppState>,
    Path(cost): Path<f64>,
) -> impl IntoResponse {
    let quote = QuoteResponse {
        cost_price: cost,
        sell_price: state.schedule.sell_price(cost),
        markup_percentage: state.schedule.markup_percentage(cost),
    };

    (StatusCode::OK, Json(ApiResponse::ok(quote))).into_response()
}

/// GET /api/customers - All customers
async fn list_customers(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_all_customers(&conn) {
        Ok(customers) => {
            let response: Vec<CustomerResponse> =
                customers.into_iter().map(|c| c.into()).collect();

            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            eprintln!("Error listing customers: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Vec::<CustomerResponse>::new())),
            )
                .into_response()
        }
    }
}

/// GET /api/jobs - All jobs
async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    match get_all_jobs(&conn) {
        Ok(jobs) => {
            let response: Vec<JobResponse> = jobs.into_iter().map(|j| j.into()).collect();
            (StatusCode::OK, Json(ApiResponse::ok(response))).into_response()
        }
        Err(e) => {
            eprintln!("Error listing jobs: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(Vec::<JobResponse>::new())),
            )
                .into_response()
        }
    }
}

/// GET /api/jobs/:number - One job by its job number
async fn get_job(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    let decoded = urlencoding::decode(&number)
        .unwrap_or_else(|_| number.clone().into())
        .into_owned();

    match get_job_by_number(&conn, &decoded) {
        Ok(Some(job)) => {
            let response: JobResponse = job.into();
            (StatusCode::OK, Json(ApiResponse::ok(Some(response)))).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::ok(None::<JobResponse>)),
        )
            .into_response(),
        Err(e) => {
            eprintln!("Error getting job {}: {}", decoded, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::ok(None::<JobResponse>)),
            )
                .into_response()
        }
    }
}

/// GET /api/stats - Dashboard summary
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let conn = state.db.lock().unwrap();

    let customers = get_all_customers(&conn).unwrap_or_default();
    let items = fieldserve::get_all_items(&conn).unwrap_or_default();
    let jobs = get_all_jobs(&conn).unwrap_or_default();

    let mut status_counts: Vec<StatusCount> = Vec::new();
    for job in &jobs {
        let key = job.status.as_str().to_string();
        match status_counts.iter_mut().find(|s| s.status == key) {
            Some(entry) => entry.count += 1,
            None => status_counts.push(StatusCount {
                status: key,
                count: 1,
            }),
        }
    }

    let stats = StatsResponse {
        total_customers: customers.len(),
        total_items: items.len(),
        total_jobs: jobs.len(),
        open_jobs: jobs.iter().filter(|j| j.is_open()).count(),
        low_stock_items: items.iter().filter(|i| i.is_low_stock()).count(),
        stock_value: items.iter().map(|i| i.stock_value()).sum(),
        jobs_by_status: status_counts,
    };

    (StatusCode::OK, Json(ApiResponse::ok(stats))).into_response()
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("🌐 FieldServe - API Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let db_path = std::env::var("FIELDSERVE_DB").unwrap_or_else(|_| "fieldserve.db".to_string());
    let db_path = std::path::Path::new(&db_path);

    let conn = Connection::open(db_path).expect("Failed to open database");
    setup_database(&conn).expect("Failed to initialize schema");
    println!("✓ Database opened: {:?}", db_path);

    // Create shared state: one markup schedule for the process lifetime
    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        schedule: Arc::new(MarkupSchedule::standard()),
    };

    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/items", get(list_items))
        .route("/items/low-stock", get(list_low_stock))
        .route("/quote/:cost", get(quote_cost))
        .route("/customers", get(list_customers))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:number", get(get_job))
        .route("/stats", get(get_stats))
        .with_state(state.clone());

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://localhost:3000");
    println!("   API: http://localhost:3000/api/items");
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
