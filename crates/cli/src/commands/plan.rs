use autoflex_core::config::ConfigOverrides;
use autoflex_core::production::{CommitPolicy, ProductionReport, ProductionService};
use autoflex_db::{CatalogRepositories, RepositoryProductionSource};

use crate::commands::{load_config, open_database, runtime, CommandResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    pub ranked: bool,
    pub policy: Option<CommitPolicy>,
}

/// Prints the report itself on success, and the usual outcome payload on failure.
pub fn run(options: PlanOptions) -> CommandResult {
    let overrides = ConfigOverrides { commit_policy: options.policy, ..ConfigOverrides::default() };
    let config = match load_config("plan", overrides) {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("plan") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_database(&config).await?;

        let service = ProductionService::with_policy(
            RepositoryProductionSource::new(CatalogRepositories::sql(pool.clone())),
            config.production.commit_policy,
        );
        let report = service
            .calculate_production()
            .await
            .map_err(|error| ("planning", error.to_string(), 6u8));

        pool.close().await;
        report
    });

    let report = match result {
        Ok(report) if options.ranked => ranked(report),
        Ok(report) => report,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("plan", error_class, message, exit_code);
        }
    };

    match serde_json::to_string(&report) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("plan", "serialization", error.to_string(), 6),
    }
}

fn ranked(report: ProductionReport) -> ProductionReport {
    let suggestions = report.ranked_by_value().into_iter().cloned().collect();
    ProductionReport::new(suggestions, report.products_analyzed)
}
