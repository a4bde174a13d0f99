//! Cart mutation and display commands.

use dispaso_storefront::{Action, AddRequest};

use super::Session;
use crate::error::CliError;
use crate::output;

/// Add one unit of `id`.
pub fn add(
    session: &mut Session,
    id: String,
    name: Option<String>,
    price: Option<String>,
    image: Option<String>,
) -> Result<(), CliError> {
    if id.trim().is_empty() {
        return Err(CliError::EmptyProductId);
    }
    session.controller.dispatch(Action::AddToCart(AddRequest {
        id,
        name,
        price,
        image,
    }));
    output::print_summary(&session.controller.view().cart);
    Ok(())
}

/// Remove every unit of `id`.
pub fn remove(session: &mut Session, id: String) -> Result<(), CliError> {
    ensure_in_cart(session, &id)?;
    session.controller.dispatch(Action::Remove(id));
    output::print_summary(&session.controller.view().cart);
    Ok(())
}

/// One more unit of `id`.
pub fn increment(session: &mut Session, id: String) -> Result<(), CliError> {
    ensure_in_cart(session, &id)?;
    session.controller.dispatch(Action::Increment(id));
    output::print_summary(&session.controller.view().cart);
    Ok(())
}

/// One fewer unit of `id`.
pub fn decrement(session: &mut Session, id: String) -> Result<(), CliError> {
    ensure_in_cart(session, &id)?;
    session.controller.dispatch(Action::Decrement(id));
    output::print_summary(&session.controller.view().cart);
    Ok(())
}

/// Print the cart, or its rendered HTML.
pub fn show(session: &Session, html: bool) -> Result<(), CliError> {
    if html {
        output::print_fragments(&session.controller.render_html()?);
    } else {
        output::print_cart(&session.controller.view().cart);
    }
    Ok(())
}

fn ensure_in_cart(session: &Session, id: &str) -> Result<(), CliError> {
    if session.controller.state().cart().get(id).is_none() {
        return Err(CliError::NotInCart(id.to_string()));
    }
    Ok(())
}
