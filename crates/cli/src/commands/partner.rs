//! Courier partner registry commands.

use shiplane_server::couriers::{delhivery, shadowfax, xpressbees};
use shiplane_server::db::PartnerRepository;

use super::CliError;

/// The built-in adapters every deployment ships with.
const BUILTIN_PARTNERS: &[(&str, &str)] = &[
    (delhivery::CODE, "Delhivery"),
    (shadowfax::CODE, "Shadowfax"),
    (xpressbees::CODE, "Xpressbees"),
];

/// Seed the registry with the built-in adapters (idempotent).
pub async fn seed() -> Result<(), CliError> {
    let pool = super::connect().await?;
    let repo = PartnerRepository::new(&pool);

    for (code, name) in BUILTIN_PARTNERS {
        let partner = repo.upsert(code, name).await?;
        tracing::info!(code = %partner.code, active = partner.active, "partner seeded");
    }

    Ok(())
}

/// List partners and their active flags.
pub async fn list() -> Result<(), CliError> {
    let pool = super::connect().await?;
    let partners = PartnerRepository::new(&pool).list().await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{:<12} {:<16} {:<8}", "CODE", "NAME", "ACTIVE");
        for partner in partners {
            println!(
                "{:<12} {:<16} {:<8}",
                partner.code, partner.name, partner.active
            );
        }
    }

    Ok(())
}

/// Enable or disable a partner.
pub async fn set_active(code: &str, active: bool) -> Result<(), CliError> {
    let pool = super::connect().await?;
    PartnerRepository::new(&pool).set_active(code, active).await?;

    tracing::info!(code, active, "partner updated");
    Ok(())
}
