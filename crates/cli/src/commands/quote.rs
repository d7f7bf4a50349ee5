//! Ad-hoc quote command: compare live rates for a lane from the terminal.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;

use shiplane_core::{Money, Pincode};
use shiplane_server::config::CourierApiConfig;
use shiplane_server::couriers::types::RateRequest;
use shiplane_server::couriers::{
    CourierManager, CourierService, DelhiveryClient, ShadowfaxClient, XpressbeesClient,
};

use super::CliError;

/// Fetch and print quotes from every configured partner.
pub async fn run(
    origin: &str,
    destination: &str,
    weight_grams: u32,
    cod: bool,
    declared_value: &str,
) -> Result<(), CliError> {
    let origin = Pincode::parse(origin)
        .map_err(|e| CliError::InvalidInput(format!("origin: {e}")))?;
    let destination = Pincode::parse(destination)
        .map_err(|e| CliError::InvalidInput(format!("destination: {e}")))?;
    let declared_value: Decimal = declared_value
        .parse()
        .map_err(|_| CliError::InvalidInput("declared value must be a number".to_string()))?;
    if weight_grams == 0 {
        return Err(CliError::InvalidInput("weight must be positive".to_string()));
    }

    let config = CourierApiConfig::from_env()
        .map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let adapters: Vec<Arc<dyn CourierService>> = vec![
        Arc::new(
            DelhiveryClient::new(&config.delhivery)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?,
        ),
        Arc::new(
            ShadowfaxClient::new(&config.shadowfax)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?,
        ),
        Arc::new(
            XpressbeesClient::new(&config.xpressbees)
                .map_err(|e| CliError::InvalidInput(e.to_string()))?,
        ),
    ];
    let manager = CourierManager::new(adapters);

    // The CLI queries every configured adapter; active flags are a server concern
    let active: HashSet<String> = manager
        .adapter_codes()
        .into_iter()
        .map(String::from)
        .collect();

    let request = RateRequest {
        origin,
        destination,
        weight_grams,
        dimensions: None,
        cod,
        declared_value: Money::inr(declared_value),
    };

    let set = manager.quotes(&request, &active).await;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{:<12} {:<12} {:>10} {:>6} {:>6}",
            "PARTNER", "SERVICE", "CHARGE", "DAYS", "COD"
        );
        for quote in &set.quotes {
            let recommended = set
                .recommended
                .as_ref()
                .is_some_and(|r| r == quote);
            println!(
                "{:<12} {:<12} {:>10} {:>6} {:>6}{}",
                quote.partner_code,
                quote.service_name,
                quote.total_charge.to_string(),
                quote
                    .estimated_days
                    .map_or_else(|| "-".to_string(), |d| d.to_string()),
                if quote.cod_available { "yes" } else { "no" },
                if recommended { "  <- recommended" } else { "" },
            );
        }
        for failure in &set.failures {
            println!("{:<12} unavailable: {}", failure.partner_code, failure.message);
        }
        if set.quotes.is_empty() && set.failures.is_empty() {
            println!("no partner serves this lane");
        }
    }

    Ok(())
}
