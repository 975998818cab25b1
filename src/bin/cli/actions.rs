use anyhow::Result;
use libris::{
    config::Config,
    gutendex::Gutendex,
    service::{CatalogService, IngestOutcome, SearchOutcome},
    traits::DisplayTerminal,
    types::{author::Author, book::Book},
};

/// Everything a command needs to run.
pub struct Context {
    pub service: CatalogService,
    pub config:  Config,
    pub source:  Gutendex,
}

impl Context {
    pub fn new(service: CatalogService, config: Config) -> Self {
        let source = Gutendex::from_config(&config);
        Self {
            service,
            config,
            source,
        }
    }
}

pub fn describe_search(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::NoMatch => {
            "No book matches that title, try another search term.".to_string()
        }
        SearchOutcome::Ingested(IngestOutcome::Created(book)) => {
            format!("Added {book}")
        }
        SearchOutcome::Ingested(IngestOutcome::AlreadyExists(title)) => {
            format!("{title} is already in the catalog, a book can only be added once.")
        }
        SearchOutcome::Ingested(IngestOutcome::InvalidCandidate(rejection)) => {
            format!("Can't add the book found: {rejection}")
        }
    }
}

fn render_books(books: &[Book], config: &Config) -> Result<String> {
    if books.is_empty() {
        return Ok("No books found.".to_string());
    }
    let mut rendered = Vec::with_capacity(books.len());
    for book in books {
        rendered.push(book.fmt_to_string(config)?);
    }
    Ok(rendered.join("\n\n"))
}

async fn render_authors(ctx: &Context, authors: &[Author]) -> Result<String> {
    if authors.is_empty() {
        return Ok("No authors found.".to_string());
    }
    let mut rendered = Vec::with_capacity(authors.len());
    for author in authors {
        rendered.push(render_author(ctx, author).await?);
    }
    Ok(rendered.join("\n\n"))
}

async fn render_author(ctx: &Context, author: &Author) -> Result<String> {
    let titles = ctx.service.author_books(author).await?;
    Ok(format!(
        "{}\n{}",
        author.fmt_to_string(&ctx.config)?,
        ctx.config.output_books_of.format_vec(&titles)
    ))
}

pub async fn search(ctx: &Context, title: &str) -> Result<String> {
    let outcome = ctx.service.search_and_ingest(&ctx.source, title).await?;
    let mut s = describe_search(&outcome);
    if let SearchOutcome::Ingested(IngestOutcome::Created(book)) = &outcome {
        s = format!("Book found!\n{}", book.fmt_to_string(&ctx.config)?);
    }
    Ok(s)
}

pub async fn list_books(ctx: &Context) -> Result<String> {
    render_books(&ctx.service.all_books().await?, &ctx.config)
}

pub async fn list_authors(ctx: &Context) -> Result<String> {
    render_authors(ctx, &ctx.service.all_authors().await?).await
}

pub async fn list_alive(ctx: &Context, year: i64) -> Result<String> {
    render_authors(ctx, &ctx.service.authors_alive_since(year).await?).await
}

pub async fn list_languages(ctx: &Context) -> Result<String> {
    let languages = ctx.service.languages().await?;
    if languages.is_empty() {
        return Ok("No languages found.".to_string());
    }
    Ok(ctx
        .config
        .output_language
        .format_vec(&languages.into_iter().collect::<Vec<String>>()))
}

pub async fn list_language(ctx: &Context, code: &str) -> Result<String> {
    render_books(
        &ctx.service.books_by_language(code.trim()).await?,
        &ctx.config,
    )
}

pub async fn statistics(ctx: &Context) -> Result<String> {
    let stats = ctx.service.statistics().await?;
    if stats.is_empty() {
        return Ok("The catalog is empty, there is nothing to summarize.".to_string());
    }
    stats.fmt_to_string(&ctx.config)
}

pub async fn top(ctx: &Context, count: Option<u32>) -> Result<String> {
    let count = count.unwrap_or(ctx.config.top_count);
    render_books(&ctx.service.top_books(count).await?, &ctx.config)
}

pub async fn author(ctx: &Context, name: &str) -> Result<String> {
    match ctx.service.author_by_name(name).await? {
        Some(author) => render_author(ctx, &author).await,
        None => Ok(format!("No author found matching {:?}.", name.trim())),
    }
}

pub async fn range(ctx: &Context, from: i64, to: i64) -> Result<String> {
    if from > to {
        anyhow::bail!("The start year {from} comes after the end year {to}");
    }
    render_authors(ctx, &ctx.service.authors_alive_during_range(from, to).await?).await
}
