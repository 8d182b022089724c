//! services/client/src/bin/arsipku.rs
//!
//! Command-line front end for the Arsipku client. Each subcommand drives one
//! view controller; the resulting dialog is printed and decides the exit code.

use arsipku_core::domain::{Registration, RegistrationTicket, VerifierAction, Visibility};
use arsipku_core::listing::{ListFilter, ListQuery, SortDirection};
use arsipku_core::members::MemberEditor;
use arsipku_core::ports::TokenStore;
use arsipku_core::routes::{Route, RouteDecision};
use arsipku_core::store::{ModalAction, ModalKind};
use arsipku_lib::{
    adapters::{FileTokenStore, HttpApi},
    app::{
        annotate, appliances, auth, auth::FormOutcome, documents, organizations, profile,
        verifier, verifier::Excerpt, AppContext,
    },
    config::Config,
    error::ClientError,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "arsipku")]
#[command(author, version, about = "Client for the Arsipku document archive")]
#[command(propagate_version = true)]
struct Cli {
    /// Print the application state as JSON after the command
    #[arg(long, global = true)]
    state: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the bearer token
    Login { username: String, password: String },
    /// Forget the stored token
    Logout,
    /// Create an account; an OTP is sent to the email
    Register {
        username: String,
        name: String,
        email: String,
        password: String,
    },
    /// Confirm a registration with the OTP
    Verify { email: String, token: String },
    /// Show who the stored token belongs to
    Whoami,
    /// View or change the profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Latest public documents for the landing page
    Posts,
    /// Browse the public archive
    Browse {
        #[arg(short, long)]
        search: Option<String>,
        #[command(flatten)]
        paging: Paging,
    },
    /// List your own documents
    Documents {
        /// public, private or organization
        #[arg(long)]
        visibility: Option<String>,
        /// Only fully verified (true) or not fully verified (false) documents
        #[arg(long)]
        verified: Option<bool>,
        #[command(flatten)]
        paging: Paging,
    },
    /// Show one document
    Show { id: i64 },
    /// Other versions of a document
    Versions { id: i64 },
    /// Publish a document, optionally as a new version of `--parent`
    Publish {
        title: String,
        /// Path of a file holding the content
        content: std::path::PathBuf,
        #[arg(long, default_value = "public")]
        visibility: String,
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Annotate the characters `start..end` of a document
    Annotate {
        document: i64,
        start: usize,
        end: usize,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
    },
    /// List your annotations
    Annotations {
        #[command(flatten)]
        paging: Paging,
    },
    #[command(subcommand)]
    Verifier(VerifierCommand),
    #[command(subcommand)]
    Org(OrgCommand),
    #[command(subcommand)]
    Appliance(ApplianceCommand),
    /// Resolve a path through the route gate
    Route { path: String },
}

#[derive(Args)]
struct Paging {
    #[arg(long, default_value_t = 0)]
    page: u32,
    #[arg(long, default_value = "createdAt")]
    sort_by: String,
    /// asc or desc
    #[arg(long, default_value = "desc")]
    sort: String,
}

#[derive(Subcommand)]
enum ProfileCommand {
    Show,
    Update {
        name: String,
        /// Leave out to keep the current password
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long)]
        notifications: bool,
    },
    Delete {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum VerifierCommand {
    /// Annotations waiting for your review
    Queue,
    /// Show one annotation with its document
    Show { id: i64 },
    Accept { id: i64 },
    Reject { id: i64 },
}

#[derive(Subcommand)]
enum OrgCommand {
    List,
    Create {
        name: String,
        #[arg(short, long)]
        member: Vec<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        add: Vec<String>,
        #[arg(long)]
        remove: Vec<String>,
    },
    Delete {
        id: i64,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ApplianceCommand {
    /// Verifier requests for your documents
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Your standing on a document
    Status { document: i64 },
    /// Ask to become a verifier of a document
    Apply { document: i64 },
    Accept { document: i64, username: String },
    Reject { document: i64, username: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool, ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    debug!("Using API at {}", config.api_url);

    // --- 2. Build the Adapters and the Shared Context ---
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_path.clone()));
    let api = Arc::new(HttpApi::new(config.api_url.clone(), tokens.clone())?);
    let ctx = AppContext::new(api, tokens, config.page_size);
    auth::initialize(&ctx).await;

    // --- 3. Run the Command ---
    let ok = dispatch(&ctx, cli.command).await?;

    let state = ctx.state().await;
    if state.modal.is_open && state.modal.kind != ModalKind::Loading {
        let line = format!("[{:?}] {}", state.modal.kind, state.modal.message);
        if state.modal.kind == ModalKind::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
    if cli.state {
        print_json(&state)?;
    }
    Ok(ok)
}

async fn dispatch(ctx: &AppContext, command: Commands) -> Result<bool, ClientError> {
    let ok = match command {
        Commands::Login { username, password } => {
            form_result(auth::login(ctx, &username, &password).await)
        }
        Commands::Logout => {
            auth::logout(ctx).await;
            true
        }
        Commands::Register {
            username,
            name,
            email,
            password,
        } => {
            let registration = Registration {
                username,
                name,
                email,
                password,
            };
            match auth::register(ctx, &registration).await {
                FormOutcome::Done(ticket) => {
                    info!("Registration ticket issued for {}", ticket.email);
                    true
                }
                other => form_result(other),
            }
        }
        Commands::Verify { email, token } => {
            let ticket = RegistrationTicket {
                email,
                otp: None,
                message: None,
            };
            form_result(auth::verify_registration(ctx, Some(&ticket), &token).await)
        }
        Commands::Whoami => match ctx.state().await.session.username {
            Some(username) => {
                println!("{}", username);
                true
            }
            None => {
                eprintln!("Not signed in.");
                false
            }
        },
        Commands::Profile(command) => run_profile(ctx, command).await?,
        Commands::Posts => {
            documents::load_landing_posts(ctx).await;
            let state = ctx.state().await;
            print_json(&state.posts.latest())?;
            state.posts.error.is_none()
        }
        Commands::Browse { search, paging } => {
            let mut query = paging.query(ctx.page_size, ListFilter::None);
            let found = match search {
                Some(term) => documents::search(ctx, &mut query, &term).await,
                None => documents::browse_public(ctx, &mut query).await,
            };
            print_json(&found)?;
            print_pages(&query);
            true
        }
        Commands::Documents {
            visibility,
            verified,
            paging,
        } => {
            let filter = match (visibility, verified) {
                (Some(visibility), _) => ListFilter::Visibility(parse_visibility(&visibility)?),
                (None, Some(verified)) => ListFilter::Verified(verified),
                (None, None) => ListFilter::None,
            };
            let mut query = paging.query(ctx.page_size, filter);
            let found = documents::my_documents(ctx, &mut query).await;
            print_json(&found)?;
            print_pages(&query);
            true
        }
        Commands::Show { id } => match documents::open_document(ctx, id).await {
            Ok(view) => {
                println!("{} ({})", view.document.title, view.version);
                println!("oleh {}", view.document.owner_name);
                if let Some(published) = &view.published {
                    println!("{}", published);
                }
                if !view.tags.is_empty() {
                    println!("tags: {}", view.tags.join(", "));
                }
                println!("verifikator: {:?}", view.appliance);
                println!();
                println!("{}", view.document.content);
                true
            }
            Err(_) => false,
        },
        Commands::Versions { id } => match documents::open_document(ctx, id).await {
            Ok(view) => {
                let versions = documents::related_versions(ctx, &view.document).await;
                print_json(&versions)?;
                true
            }
            Err(_) => false,
        },
        Commands::Publish {
            title,
            content,
            visibility,
            parent,
        } => {
            let content = std::fs::read_to_string(content)?;
            let visibility = parse_visibility(&visibility)?;
            let parent = match parent {
                Some(id) => match documents::open_document(ctx, id).await {
                    Ok(view) => Some(view.document),
                    Err(_) => return Ok(false),
                },
                None => None,
            };
            let document =
                documents::new_document(&title, &content, visibility, parent.as_ref());
            documents::publish(ctx, &document).await
        }
        Commands::Annotate {
            document,
            start,
            end,
            description,
            tags,
        } => {
            let Ok(mut session) = annotate::open(ctx, document).await else {
                return Ok(false);
            };
            if !session.can_annotate() {
                eprintln!("You are not an accepted verifier of this document.");
                return Ok(false);
            }
            session.start_marking();
            if !session.select(start, end) {
                session.mark_current();
            }
            session
                .set_description(&description)
                .map_err(|e| ClientError::Internal(e.to_string()))?;
            session
                .set_tags(&tags)
                .map_err(|e| ClientError::Internal(e.to_string()))?;
            let ok = annotate::submit(ctx, &mut session).await;
            if ok {
                print_json(&session.annotations())?;
            }
            ok
        }
        Commands::Annotations { paging } => {
            let mut query = paging.query(ctx.page_size, ListFilter::None);
            let found = annotate::my_annotations(ctx, &mut query).await;
            print_json(&found)?;
            print_pages(&query);
            true
        }
        Commands::Verifier(command) => run_verifier(ctx, command).await?,
        Commands::Org(command) => run_org(ctx, command).await?,
        Commands::Appliance(command) => run_appliance(ctx, command).await?,
        Commands::Route { path } => {
            match Route::parse(&path).guard(ctx.tokens.has_token()) {
                RouteDecision::Render(route) => println!("render {}", route),
                RouteDecision::Redirect(route) => println!("redirect {}", route),
            }
            true
        }
    };
    Ok(ok)
}

async fn run_profile(ctx: &AppContext, command: ProfileCommand) -> Result<bool, ClientError> {
    let ok = match command {
        ProfileCommand::Show => match profile::load(ctx).await {
            Some(profile) => {
                print_json(&profile)?;
                true
            }
            None => false,
        },
        ProfileCommand::Update {
            name,
            password,
            notifications,
        } => profile::update(ctx, &name, &password, notifications).await,
        ProfileCommand::Delete { yes } => {
            if !yes {
                eprintln!("Pass --yes to delete the account.");
                return Ok(false);
            }
            profile::delete(ctx).await
        }
    };
    Ok(ok)
}

async fn run_verifier(ctx: &AppContext, command: VerifierCommand) -> Result<bool, ClientError> {
    let ok = match command {
        VerifierCommand::Queue => {
            let queue = verifier::queue(ctx).await;
            match &queue.notice {
                Some(notice) => println!("{}", notice),
                None => print_json(&queue.items)?,
            }
            true
        }
        VerifierCommand::Show { id } => match verifier::detail(ctx, id).await {
            Some(review) => {
                println!(
                    "{} oleh {}",
                    review.annotation.document_name, review.annotation.full_name
                );
                match &review.excerpt {
                    Excerpt::Highlighted {
                        before,
                        highlighted,
                        after,
                    } => println!("{}[[{}]]{}", before, highlighted, after),
                    Excerpt::Plain(content) => println!("{}", content),
                }
                println!();
                println!("{}", review.annotation.description);
                true
            }
            None => false,
        },
        VerifierCommand::Accept { id } => verifier::review(ctx, id, VerifierAction::Accept).await,
        VerifierCommand::Reject { id } => verifier::review(ctx, id, VerifierAction::Reject).await,
    };
    Ok(ok)
}

async fn run_org(ctx: &AppContext, command: OrgCommand) -> Result<bool, ClientError> {
    let ok = match command {
        OrgCommand::List => {
            print_json(&organizations::list(ctx).await)?;
            true
        }
        OrgCommand::Create { name, member } => {
            let mut members = MemberEditor::default();
            for email in &member {
                members.add(email);
            }
            organizations::create(ctx, &name, &members).await
        }
        OrgCommand::Update {
            id,
            name,
            add,
            remove,
        } => {
            let Some(mut form) = organizations::load_for_update(ctx, id).await else {
                return Ok(false);
            };
            if let Some(name) = name {
                form.name = name;
            }
            for email in &add {
                form.members.add(email);
            }
            for email in &remove {
                form.members.remove(email);
            }
            organizations::update(ctx, &form).await
        }
        OrgCommand::Delete { id, yes } => {
            organizations::request_delete(ctx, id).await;
            if !yes {
                eprintln!("Pass --yes to confirm.");
                return Ok(false);
            }
            match ctx.confirm_modal().await {
                Some(ModalAction::DeleteOrganization(id)) => organizations::delete(ctx, id).await,
                _ => false,
            }
        }
    };
    Ok(ok)
}

async fn run_appliance(ctx: &AppContext, command: ApplianceCommand) -> Result<bool, ClientError> {
    let ok = match command {
        ApplianceCommand::List { page } => {
            let mut query = ListQuery::new("createdAt", ctx.page_size);
            query.apply_total_pages(page.saturating_add(1));
            query.select_page(page);
            let found = appliances::list(ctx, &mut query).await;
            print_json(&found)?;
            print_pages(&query);
            true
        }
        ApplianceCommand::Status { document } => {
            println!("{:?}", appliances::status(ctx, document).await);
            true
        }
        ApplianceCommand::Apply { document } => appliances::apply(ctx, document).await,
        ApplianceCommand::Accept { document, username } => {
            appliances::decide(ctx, document, &username, true).await
        }
        ApplianceCommand::Reject { document, username } => {
            appliances::decide(ctx, document, &username, false).await
        }
    };
    Ok(ok)
}

//=========================================================================================
// Helpers
//=========================================================================================

impl Paging {
    fn query(&self, page_size: u32, filter: ListFilter) -> ListQuery {
        let mut query = ListQuery::new(&self.sort_by, page_size);
        if let Some(sort) = SortDirection::parse(&self.sort) {
            query.set_sort(sort);
        }
        query.set_filter(filter);
        // The page count is unknown until the first response corrects it.
        query.apply_total_pages(self.page.saturating_add(1));
        query.select_page(self.page);
        query
    }
}

fn parse_visibility(value: &str) -> Result<Visibility, ClientError> {
    Visibility::parse(value)
        .ok_or_else(|| ClientError::Internal(format!("Unknown visibility '{}'", value)))
}

fn form_result<T>(outcome: FormOutcome<T>) -> bool {
    match outcome {
        FormOutcome::Done(_) => true,
        FormOutcome::FieldErrors(errors) => {
            for (field, message) in errors {
                eprintln!("{}: {}", field, message);
            }
            false
        }
        FormOutcome::Failed(_) => false,
    }
}

fn print_pages(query: &ListQuery) {
    if query.total_pages() > 1 {
        println!("page {} of {}", query.page() + 1, query.total_pages());
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
