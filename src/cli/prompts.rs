//! Interactive prompts for user operations

use anyhow::Result;
use dialoguer::{Input, Password};

use crate::api::{NewUser, UserUpdate};

/// Prompt for the fields of a new user. All fields are required; dialoguer
/// re-prompts on empty input.
pub fn prompt_new_user() -> Result<NewUser> {
    let email = Input::<String>::new()
        .with_prompt("Email")
        .interact()?;

    let password = Password::new()
        .with_prompt("Password")
        .interact()?;

    let given_name = Input::<String>::new()
        .with_prompt("Given name")
        .interact()?;

    let family_name = Input::<String>::new()
        .with_prompt("Family name")
        .interact()?;

    Ok(NewUser {
        email,
        password,
        given_name,
        family_name,
    })
}

/// Prompt for a user id and the fields to change. Blank fields are dropped,
/// so leaving everything blank yields an empty update.
pub fn prompt_user_update() -> Result<(String, UserUpdate)> {
    let user_id = Input::<String>::new()
        .with_prompt("User id (e.g. 'auth0|507f1f77bcf86cd799439020')")
        .interact()?;

    println!("Leave a field blank to keep its current value.");

    let email = Input::<String>::new()
        .with_prompt("New email")
        .allow_empty(true)
        .interact()?;

    let given_name = Input::<String>::new()
        .with_prompt("New given name")
        .allow_empty(true)
        .interact()?;

    let family_name = Input::<String>::new()
        .with_prompt("New family name")
        .allow_empty(true)
        .interact()?;

    let update = UserUpdate {
        email: Some(email),
        given_name: Some(given_name),
        family_name: Some(family_name),
    }
    .normalized();

    Ok((user_id, update))
}
