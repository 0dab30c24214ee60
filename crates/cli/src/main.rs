use clap::{Parser, Subcommand};
use suprident_core::config::database_path_from_env_value;
use suprident_core::{Database, ListService, Material, Profissional, ROLE_ADMIN};
use suprident_types::Centavos;

#[derive(Parser)]
#[command(name = "suprident")]
#[command(about = "Materials-request and delivery-tracking admin CLI")]
struct Cli {
    /// SQLite database file (defaults to $SUPRIDENT_DATABASE or suprident.db)
    #[arg(long)]
    database: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the month's request lists, one per professional
    CreateLists {
        /// Month in YYYY-MM form (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// List the request lists of a month
    ListLists {
        /// Month in YYYY-MM form (defaults to the current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Create an administrator account
    CreateAdmin {
        /// Display name
        nome: String,
        /// Login identifier
        login: String,
        /// Access code
        code: String,
    },
    /// Add a material to the catalog
    AddMaterial {
        /// Material name
        nome: String,
        /// Unit price in pt-BR notation, e.g. "15,00" or "R$ 1.234,56"
        preco: String,
        /// Category
        #[arg(long)]
        tipo: Option<String>,
    },
    /// Update a material's current price (existing lists keep their snapshot)
    SetPrice {
        /// Material id
        material_id: String,
        /// New unit price in pt-BR notation
        preco: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let database_path = match cli.database {
        Some(path) => path.into(),
        None => database_path_from_env_value(std::env::var("SUPRIDENT_DATABASE").ok()),
    };
    let db = Database::open(&database_path)?;

    match cli.command {
        Some(Commands::CreateLists { month }) => {
            let month = month.unwrap_or_else(current_month);
            let created = ListService::new(&db).create_monthly_lists(&month)?;
            println!("Created {created} lists for {month}");
        }
        Some(Commands::ListLists { month }) => {
            let month = month.unwrap_or_else(current_month);
            let listas = db.listas_by_month(&month)?;
            if listas.is_empty() {
                println!("No lists found for {month}.");
            } else {
                for lista in listas {
                    println!(
                        "ID: {}, Professional: {}, Clinic: {}, Status: {}, Total: {}",
                        lista.id,
                        lista.profissional_id,
                        lista.clinica_id,
                        lista.status.as_str(),
                        lista
                            .preco_total
                            .map(|total| total.format_brl())
                            .unwrap_or_else(|| "-".into()),
                    );
                }
            }
        }
        Some(Commands::CreateAdmin { nome, login, code }) => {
            let mut admin = Profissional::new(nome, None);
            admin.login = Some(login.clone());
            admin.senha = Some(code);
            admin.role = ROLE_ADMIN.to_owned();
            db.insert_profissional(&admin)?;
            println!("Created administrator {login} with id {}", admin.id);
        }
        Some(Commands::AddMaterial { nome, preco, tipo }) => {
            let preco = Centavos::parse_brl(&preco)?;
            let material = Material::new(nome, tipo, preco);
            db.insert_material(&material)?;
            println!(
                "Added {} at {} with id {}",
                material.nome,
                material.preco.format_brl(),
                material.id
            );
        }
        Some(Commands::SetPrice { material_id, preco }) => {
            let preco = Centavos::parse_brl(&preco)?;
            if db.update_material_preco(&material_id, preco)? {
                println!("Updated {material_id} to {}", preco.format_brl());
            } else {
                eprintln!("No material with id {material_id}");
            }
        }
        None => {
            println!("No command given; try --help");
        }
    }

    Ok(())
}

fn current_month() -> String {
    chrono::Utc::now().format("%Y-%m").to_string()
}
