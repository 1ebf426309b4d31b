use serde::Serialize;

use formwatch_store::{run_migrations, PostgresFingerprintStore};

use crate::exit_codes;
use crate::output::{print_error, print_result, OutputFormat};
use crate::utils::redact_url_password;
use crate::{OutputArgs, StoreArgs};

#[derive(Serialize)]
struct MigrateResult {
    success: bool,
    message: String,
    purged: u64,
}

pub async fn migrate_cmd(store: StoreArgs, output: OutputArgs) -> i32 {
    let database_url = match store.resolved_url() {
        Some(v) => v,
        None => {
            print_error(
                output.format,
                output.quiet,
                "missing database url (use --database-url or set FORMWATCH_DATABASE_URL / DATABASE_URL)",
            );
            return exit_codes::INFRASTRUCTURE_ERROR;
        }
    };

    let pg = match PostgresFingerprintStore::connect(&database_url, store.max_connections).await {
        Ok(s) => s,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!(
                    "failed to connect to {}: {e}",
                    redact_url_password(&database_url)
                ),
            );
            return exit_codes::INFRASTRUCTURE_ERROR;
        }
    };

    if let Err(e) = run_migrations(pg.pool()).await {
        print_error(output.format, output.quiet, &format!("migration failed: {e}"));
        return exit_codes::INFRASTRUCTURE_ERROR;
    }
    tracing::info!("fingerprint store migrations applied");

    // Expired claims never suppress anything; dropping them keeps the table small.
    let purged = match pg.purge_expired().await {
        Ok(n) => n,
        Err(e) => {
            print_error(output.format, output.quiet, &format!("purging expired fingerprints failed: {e}"));
            return exit_codes::INFRASTRUCTURE_ERROR;
        }
    };
    tracing::info!(purged, "expired fingerprints purged");

    let result = MigrateResult {
        success: true,
        message: "migrations applied".to_string(),
        purged,
    };
    if output.format == OutputFormat::Text && !output.quiet {
        println!("ok: migrations applied, {purged} expired fingerprint(s) purged");
    } else {
        print_result(output.format, output.quiet, &result);
    }
    exit_codes::SUCCESS
}
