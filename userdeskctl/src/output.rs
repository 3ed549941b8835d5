use anyhow::Result;
use userdesk_client::Session;
use userdesk_model::User;

pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn user_table(users: &[User]) {
    if users.is_empty() {
        println!("No users.");
        return;
    }
    let name_width =
        users.iter().map(|u| u.name.len()).max().unwrap_or(4).max(4);
    let email_width =
        users.iter().map(|u| u.email.len()).max().unwrap_or(5).max(5);
    println!(
        "{:>6}  {:<name_width$}  {:<email_width$}  {:<5}  ACTIVE",
        "ID", "NAME", "EMAIL", "ROLE"
    );
    for user in users {
        println!(
            "{:>6}  {:<name_width$}  {:<email_width$}  {:<5}  {}",
            user.id,
            user.name,
            user.email,
            user.derived_role(),
            if user.is_active { "yes" } else { "no" }
        );
    }
}

pub fn user_detail(user: &User) {
    println!("id:      {}", user.id);
    println!("name:    {}", user.name);
    println!("email:   {}", user.email);
    println!("role:    {}", user.derived_role());
    println!("active:  {}", user.is_active);
    if let Some(at) = user.created_at {
        println!("created: {}", at.to_rfc3339());
    }
    if let Some(at) = user.updated_at {
        println!("updated: {}", at.to_rfc3339());
    }
}

pub fn session_line(session: &Session) -> String {
    let user = &session.user.user;
    format!("{} <{}> ({})", user.name, user.email, session.role())
}
