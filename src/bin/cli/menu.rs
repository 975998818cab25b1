use std::fmt::Display;

use anyhow::Result;
use inquire::{validator::Validation, CustomUserError, InquireError};
use tracing::debug;

use crate::{actions, actions::Context, print_error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuOption {
    Search,
    ListBooks,
    ListAuthors,
    AliveSince,
    ByLanguage,
    Statistics,
    Top,
    AuthorByName,
    AliveDuring,
    Exit,
}

impl MenuOption {
    const ALL: [MenuOption; 10] = [
        MenuOption::Search,
        MenuOption::ListBooks,
        MenuOption::ListAuthors,
        MenuOption::AliveSince,
        MenuOption::ByLanguage,
        MenuOption::Statistics,
        MenuOption::Top,
        MenuOption::AuthorByName,
        MenuOption::AliveDuring,
        MenuOption::Exit,
    ];

    fn label(&self) -> &'static str {
        match self {
            MenuOption::Search => "Search a book by title",
            MenuOption::ListBooks => "List stored books",
            MenuOption::ListAuthors => "List stored authors",
            MenuOption::AliveSince => "List authors alive in a given year",
            MenuOption::ByLanguage => "List books by language",
            MenuOption::Statistics => "Download statistics",
            MenuOption::Top => "Most downloaded books",
            MenuOption::AuthorByName => "Find an author by name",
            MenuOption::AliveDuring => "List authors born and deceased within a range of years",
            MenuOption::Exit => "Exit",
        }
    }
}

impl Display for MenuOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let position = MenuOption::ALL
            .iter()
            .position(|x| x == self)
            .unwrap_or_default();
        let number = if *self == MenuOption::Exit { 0 } else { position + 1 };
        write!(f, "{number}. {}", self.label())
    }
}

fn validator_non_empty(input: &str) -> Result<Validation, CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid(
            inquire::validator::ErrorMessage::Custom("Input can't be empty".to_string()),
        ))
    } else {
        Ok(Validation::Valid)
    }
}

fn text(prompt: &str) -> Result<Option<String>, InquireError> {
    inquire::Text::new(prompt)
        .with_validator(validator_non_empty)
        .prompt_skippable()
}

fn year(prompt: &str) -> Result<Option<i64>, InquireError> {
    inquire::CustomType::<i64>::new(prompt)
        .with_error_message("Input isn't a valid year")
        .prompt_skippable()
}

fn language(ctx: &Context) -> Result<Option<String>, InquireError> {
    let languages = ctx.config.menu_languages.clone();
    let help = languages.join(", ");
    let config = ctx.config.clone();
    inquire::Text::new("Language code:")
        .with_help_message(&help)
        .with_validator(move |input: &str| {
            if config.is_menu_language(input) {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    inquire::validator::ErrorMessage::Custom(format!(
                        "Choose one of {}",
                        languages.join(", ")
                    )),
                ))
            }
        })
        .prompt_skippable()
        .map(|x| x.map(|code| code.trim().to_lowercase()))
}

/// Runs one menu entry. `None` means the user backed out of a prompt.
async fn handle(option: MenuOption, ctx: &Context) -> Result<Option<String>> {
    let output = match option {
        MenuOption::Search => match text("Title of the book:")? {
            Some(title) => actions::search(ctx, &title).await?,
            None => return Ok(None),
        },
        MenuOption::ListBooks => actions::list_books(ctx).await?,
        MenuOption::ListAuthors => actions::list_authors(ctx).await?,
        MenuOption::AliveSince => match year("Year the authors were alive in:")? {
            Some(year) => actions::list_alive(ctx, year).await?,
            None => return Ok(None),
        },
        MenuOption::ByLanguage => match language(ctx)? {
            Some(code) => actions::list_language(ctx, &code).await?,
            None => return Ok(None),
        },
        MenuOption::Statistics => actions::statistics(ctx).await?,
        MenuOption::Top => actions::top(ctx, None).await?,
        MenuOption::AuthorByName => match text("Name of the author:")? {
            Some(name) => actions::author(ctx, &name).await?,
            None => return Ok(None),
        },
        MenuOption::AliveDuring => {
            let Some(from) = year("First year of the range:")? else {
                return Ok(None);
            };
            let Some(to) = year("Last year of the range:")? else {
                return Ok(None);
            };
            actions::range(ctx, from, to).await?
        }
        MenuOption::Exit => return Ok(None),
    };
    Ok(Some(output))
}

pub async fn run(ctx: &Context) -> Result<()> {
    loop {
        let choice = inquire::Select::new("Choose an option:", MenuOption::ALL.to_vec())
            .with_page_size(MenuOption::ALL.len())
            .prompt_skippable();
        let option = match choice {
            Ok(None) | Ok(Some(MenuOption::Exit)) => return Ok(()),
            Err(InquireError::OperationInterrupted) => return Ok(()),
            Err(e) => return Err(e.into()),
            Ok(Some(option)) => option,
        };
        match handle(option, ctx).await {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => debug!("Prompt for {:?} cancelled", option),
            Err(e) => match e.downcast_ref::<InquireError>() {
                Some(InquireError::OperationInterrupted) => return Ok(()),
                _ => print_error(&ctx.config, &e),
            },
        }
    }
}
