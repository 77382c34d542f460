use dotenvy::dotenv;
use taxidermy_crm::{
    config::{self, database},
    core::{
        seed::seed_demo_data,
        session::Session,
        stats::{dashboard_stats, format_currency, invoice_summary},
        store::Records,
        visibility::{SearchTerm, recent_jobs, visible_invoices},
    },
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Jobs shown in the dashboard's recent list
const RECENT_JOBS_LIMIT: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database ready");

    // 5. Load demo data into a fresh database
    if seed_demo_data(&db).await? {
        info!("Demo accounts use the password from [auth].shared_secret");
    }

    // 6. Restore whoever was signed in last time
    let session = Session::restore(&db, app_config.auth.clone()).await?;
    let Some(user) = session.current_user() else {
        info!("No active session; sign in as a hunter, taxidermist, or admin");
        return Ok(());
    };

    // 7. Summarize what this user can see
    let visibility = session.visibility();
    let records = Records::load(&db).await?;
    let now = chrono::Utc::now();

    let stats = dashboard_stats(&visibility, &records);
    info!(
        "{} ({}): {} clients, {} active jobs, {} completed jobs",
        user.full_name(),
        user.role,
        stats.total_clients,
        stats.active_jobs,
        stats.completed_jobs
    );
    if let Some(revenue) = stats.total_revenue {
        info!("Revenue collected: {}", format_currency(revenue));
    }
    if let Some(pending) = stats.pending_jobs {
        info!("Jobs waiting to start: {}", pending);
    }

    let rows = visible_invoices(&visibility, &records, &SearchTerm::default());
    let summary = invoice_summary(&rows, now);
    info!(
        "Invoices: {} total, {} overdue, {} outstanding",
        summary.invoice_count,
        summary.overdue_count,
        format_currency(summary.total_outstanding)
    );

    for job in recent_jobs(&visibility, &records, RECENT_JOBS_LIMIT) {
        info!("  {} [{}] due {}", job.title(), job.status, job.due_date.date_naive());
    }

    Ok(())
}
