//! Interactive session menu for the directory

use anyhow::Result;
use colored::*;
use dialoguer::Select;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, PageCursor, UserOperations};

use super::prompts;

fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

/// Pause and wait for user to press Enter
fn pause_for_user() {
    use std::io::{self, Write};
    print!("Press Enter to continue...");
    io::stdout().flush().unwrap();
    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();
}

/// Main session menu options
#[derive(Debug)]
enum MainMenuOption {
    ListUsers,
    CreateUser,
    UpdateUser,
    Exit,
}

impl std::fmt::Display for MainMenuOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainMenuOption::ListUsers => write!(f, "📋 {} - {}", "List users".bright_blue().bold(), "Browse the directory page by page".dimmed()),
            MainMenuOption::CreateUser => write!(f, "➕ {} - {}", "Create user".bright_green().bold(), "Add a new user to the directory".dimmed()),
            MainMenuOption::UpdateUser => write!(f, "✏️ {} - {}", "Update user".bright_yellow().bold(), "Change fields on an existing user".dimmed()),
            MainMenuOption::Exit => write!(f, "🚪 {} - {}", "Exit".bright_red().bold(), "Leave the session".dimmed()),
        }
    }
}

/// Run the interactive session until the user exits or the session is canceled.
pub async fn run(users: UserOperations, cancel: CancellationToken) -> Result<()> {
    loop {
        if cancel.is_cancelled() {
            break;
        }

        clear_screen();
        println!();
        println!("  {}", "👥 Directory CLI - User Management".bright_blue().bold());
        println!("  {}", "══════════════════════════════════".bright_blue());
        println!();

        let options = vec![
            MainMenuOption::ListUsers,
            MainMenuOption::CreateUser,
            MainMenuOption::UpdateUser,
            MainMenuOption::Exit,
        ];

        // In raw mode Ctrl-C surfaces as an interrupted read, not a signal.
        let selection = match Select::new()
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()
        {
            Ok(selection) => selection,
            Err(_) if cancel.is_cancelled() => break,
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => {
                cancel.cancel();
                break;
            }
            Err(e) => return Err(e.into()),
        };

        match options[selection] {
            MainMenuOption::ListUsers => {
                browse_users(&users, &cancel).await.unwrap_or_else(|e| {
                    println!("Error: {}", e);
                });
                if !cancel.is_cancelled() {
                    pause_for_user();
                }
            }
            MainMenuOption::CreateUser => {
                create_user(&users, &cancel).await.unwrap_or_else(|e| {
                    println!("Error: {}", e);
                });
                if !cancel.is_cancelled() {
                    pause_for_user();
                }
            }
            MainMenuOption::UpdateUser => {
                update_user(&users, &cancel).await.unwrap_or_else(|e| {
                    println!("Error: {}", e);
                });
                if !cancel.is_cancelled() {
                    pause_for_user();
                }
            }
            MainMenuOption::Exit => {
                println!("Goodbye!");
                break;
            }
        }
    }

    if cancel.is_cancelled() {
        println!();
        println!("{}", "Session canceled.".yellow());
    }

    Ok(())
}

/// Print an operation error without treating a cancellation as a failure.
fn report_api_error(error: &ApiError) {
    if error.is_canceled() {
        println!("{}", "Operation canceled.".yellow());
    } else {
        println!("{} {}", "Error:".bright_red().bold(), error);
    }
}

/// Page through the directory until it is exhausted or the user goes back.
async fn browse_users(users: &UserOperations, cancel: &CancellationToken) -> Result<()> {
    println!();
    println!("  {}", "📋 Directory Users".bright_blue().bold());

    let mut cursor = PageCursor::first();

    loop {
        let page = match users.list_users(cursor, cancel).await {
            Ok(page) => page,
            Err(error) => {
                report_api_error(&error);
                return Ok(());
            }
        };

        if page.is_empty() {
            println!();
            if cursor.page == 0 {
                println!("{}", "The directory has no users.".yellow());
            } else {
                println!("{}", "No more users.".yellow());
            }
            return Ok(());
        }

        println!();
        println!("  {}", format!("Page {}", cursor.page + 1).bright_white().bold());
        for user in &page {
            let verified = if user.email_verified {
                "✓".green()
            } else {
                "✗".red()
            };
            println!(
                "  {} {} {} {}",
                verified,
                user.email.bold(),
                user.display_name().dimmed(),
                user.user_id.dimmed()
            );
        }

        if (page.len() as u32) < cursor.per_page {
            println!();
            println!("{}", "End of the directory.".yellow());
            return Ok(());
        }

        println!();
        let choices = vec!["Next page", "Back to menu"];
        let selection = match Select::new()
            .with_prompt("More?")
            .items(&choices)
            .default(0)
            .interact()
        {
            Ok(selection) => selection,
            Err(_) if cancel.is_cancelled() => return Ok(()),
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => {
                cancel.cancel();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        if selection == 1 {
            return Ok(());
        }
        cursor = cursor.next();
    }
}

async fn create_user(users: &UserOperations, cancel: &CancellationToken) -> Result<()> {
    println!();
    println!("  {}", "➕ Create User".bright_green().bold());
    println!();

    let new_user = prompts::prompt_new_user()?;

    match users.create_user(&new_user, cancel).await {
        Ok(user) => {
            println!();
            println!(
                "{} {} ({})",
                "Created".bright_green().bold(),
                user.email.bold(),
                user.user_id.dimmed()
            );
        }
        Err(error) => report_api_error(&error),
    }

    Ok(())
}

async fn update_user(users: &UserOperations, cancel: &CancellationToken) -> Result<()> {
    println!();
    println!("  {}", "✏️ Update User".bright_yellow().bold());
    println!();

    let (user_id, update) = prompts::prompt_user_update()?;

    match users.update_user(&user_id, update, cancel).await {
        Ok(user) => {
            println!();
            println!(
                "{} {} ({})",
                "Updated".bright_green().bold(),
                user.email.bold(),
                user.user_id.dimmed()
            );
        }
        Err(error) => report_api_error(&error),
    }

    Ok(())
}
