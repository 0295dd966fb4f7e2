use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use md_api_types::{DiscoverParams, MovieId, MoviePage, Route};
use md_app_core::AppContext;
use md_auth_store::Navigation;
use md_catalog_client::{CatalogClient, DEFAULT_IMAGE_SIZE, image_url, image_url_w500};
use std::io::Write;

#[derive(Debug, Parser)]
#[command(name = "moviedeck", version, about = "Browse the movie catalog and keep a wishlist")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a local account.
    Register { email: String, password: String },
    /// Sign in; the password doubles as the catalog API key.
    Login {
        email: String,
        password: String,
        /// Keep the session for this run only.
        #[arg(long)]
        no_remember: bool,
    },
    Logout,
    Whoami,
    Popular(PageArgs),
    NowPlaying(PageArgs),
    TopRated(PageArgs),
    Action(PageArgs),
    Comedy(PageArgs),
    Search {
        query: String,
        #[command(flatten)]
        page: PageArgs,
    },
    Discover {
        #[arg(long)]
        genre: Option<u32>,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long)]
        sort_by: Option<String>,
        #[arg(long)]
        released_before: Option<String>,
        #[command(flatten)]
        page: PageArgs,
    },
    Detail { id: MovieId },
    Wishlist {
        #[command(subcommand)]
        action: WishlistCommand,
    },
    /// Print the poster URL for a relative image path.
    ImageUrl {
        path: String,
        #[arg(long, default_value = DEFAULT_IMAGE_SIZE)]
        size: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum WishlistCommand {
    List,
    Toggle { id: MovieId },
}

impl Command {
    /// Screen of the web client this command stands in for; decides whether
    /// a session is needed.
    pub fn route(&self) -> Route {
        match self {
            Command::Register { .. }
            | Command::Login { .. }
            | Command::Logout
            | Command::Whoami
            | Command::ImageUrl { .. } => Route::SignIn,
            Command::Popular(_) | Command::NowPlaying(_) | Command::TopRated(_) => Route::Popular,
            Command::Search { .. } | Command::Discover { .. } => Route::Search,
            Command::Wishlist { .. } => Route::Wishlist,
            Command::Action(_) | Command::Comedy(_) | Command::Detail { .. } => Route::Home,
        }
    }
}

pub async fn run<C, W>(command: Command, app: &mut AppContext<C>, out: &mut W) -> Result<()>
where
    C: CatalogClient,
    W: Write,
{
    if let Navigation::Redirect(to) = app.navigate(command.route().path())? {
        bail!("sign in first (redirected to {to})");
    }

    match command {
        Command::Register { email, password } => {
            if app.auth_mut().register(&email, &password)? {
                writeln!(out, "registered {email}")?;
            } else {
                bail!("{email} is already registered");
            }
        }
        Command::Login {
            email,
            password,
            no_remember,
        } => {
            if !app.auth_mut().login(&email, &password, !no_remember)? {
                bail!("invalid email or password");
            }
            writeln!(out, "signed in as {email}")?;
        }
        Command::Logout => {
            app.auth_mut().logout()?;
            writeln!(out, "signed out")?;
        }
        Command::Whoami => match app.auth().current_user() {
            Some(user) => writeln!(out, "{}", user.id)?,
            None => writeln!(out, "not signed in")?,
        },
        Command::Popular(args) => print_page(out, &app.catalog().fetch_popular(args.page).await?)?,
        Command::NowPlaying(args) => {
            print_page(out, &app.catalog().fetch_now_playing(args.page).await?)?
        }
        Command::TopRated(args) => {
            print_page(out, &app.catalog().fetch_top_rated(args.page).await?)?
        }
        Command::Action(args) => print_page(out, &app.catalog().fetch_action(args.page).await?)?,
        Command::Comedy(args) => print_page(out, &app.catalog().fetch_comedy(args.page).await?)?,
        Command::Search { query, page } => {
            print_page(out, &app.catalog().search(&query, page.page).await?)?
        }
        Command::Discover {
            genre,
            min_rating,
            sort_by,
            released_before,
            page,
        } => {
            let params = DiscoverParams {
                with_genres: genre,
                vote_average_gte: min_rating,
                sort_by,
                release_date_lte: released_before,
                page: Some(page.page),
                extra: Vec::new(),
            };
            print_page(out, &app.catalog().discover(&params).await?)?
        }
        Command::Detail { id } => {
            let detail = app.open_detail(id).await?;
            let movie = &detail.movie;
            writeln!(out, "{} ({})", movie.title, movie.release_date.as_deref().unwrap_or("?"))?;
            if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
                writeln!(out, "{tagline}")?;
            }
            if let Some(overview) = &movie.overview {
                writeln!(out, "{overview}")?;
            }
            let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
            writeln!(out, "genres: {}", genres.join(", "))?;
            writeln!(out, "poster: {}", image_url_w500(&movie.poster_path))?;
            let saved = if app.wishlist().contains(id) { "yes" } else { "no" };
            writeln!(out, "in wishlist: {saved}")?;
            app.modal_mut().close();
        }
        Command::Wishlist { action } => match action {
            WishlistCommand::List => {
                if app.wishlist().is_empty() {
                    writeln!(out, "wishlist is empty")?;
                }
                for movie in app.wishlist().entries() {
                    writeln!(out, "{}\t{}", movie.id, movie.title)?;
                }
            }
            WishlistCommand::Toggle { id } => {
                let added = app.toggle_wishlist_by_id(id).await?;
                let verb = if added { "added" } else { "removed" };
                writeln!(out, "{verb} {id}")?;
            }
        },
        Command::ImageUrl { path, size } => writeln!(out, "{}", image_url(&path, &size))?,
    }

    Ok(())
}

fn print_page<W: Write>(out: &mut W, page: &MoviePage) -> Result<()> {
    for movie in &page.results {
        let rating = movie
            .vote_average
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_owned());
        writeln!(out, "{}\t{}\t{}", movie.id, rating, movie.title)?;
    }
    writeln!(out, "page {}/{}", page.page, page.total_pages)?;
    Ok(())
}
