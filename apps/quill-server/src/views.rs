//! Server-rendered HTML pages.
//!
//! Every user-supplied string goes through [`escape`] before it reaches the
//! markup.

use actix_web::{HttpResponse, http::header::ContentType};

use quill_core::domain::{Post, SessionUser};

/// Wrap a rendered page in a `200 OK` HTML response.
pub fn page(markup: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(markup)
}

/// Home page: every post, newest first.
pub fn index(posts: &[Post], user: Option<&SessionUser>) -> String {
    let mut content = String::from("<h1>Quill</h1>\n");

    if posts.is_empty() {
        content.push_str("<p>No posts yet.</p>\n");
    }

    for post in posts {
        let owned = user.is_some_and(|u| post.is_owned_by(u.user_id));
        content.push_str(&format!(
            "<article>\n<h2><a href=\"/post/{id}\">{title}</a></h2>\n{meta}\n<p>{body}</p>\n{actions}</article>\n",
            id = post.blog_id,
            title = escape(&post.title),
            meta = byline(post),
            body = escape(&post.body),
            actions = if owned { owner_actions(post) } else { String::new() },
        ));
    }

    layout("Quill", user, &content)
}

/// Single post page.
pub fn post(post: &Post, user: Option<&SessionUser>) -> String {
    let owned = user.is_some_and(|u| post.is_owned_by(u.user_id));
    let content = format!(
        "<article>\n<h1>{title}</h1>\n{meta}\n<p>{body}</p>\n{actions}</article>\n<p><a href=\"/\">Back</a></p>\n",
        title = escape(&post.title),
        meta = byline(post),
        body = escape(&post.body),
        actions = if owned { owner_actions(post) } else { String::new() },
    );
    layout(&post.title, user, &content)
}

pub fn signup() -> String {
    let content = "<h1>Sign up</h1>\n\
        <form method=\"post\" action=\"/signup\">\n\
        <label>Name <input name=\"name\" required></label>\n\
        <label>Password <input type=\"password\" name=\"password\" required></label>\n\
        <button type=\"submit\">Sign up</button>\n\
        </form>\n\
        <p>Already registered? <a href=\"/signin\">Sign in</a></p>\n";
    layout("Sign up", None, content)
}

pub fn signin() -> String {
    let content = "<h1>Sign in</h1>\n\
        <form method=\"post\" action=\"/signin\">\n\
        <label>Name <input name=\"name\" required></label>\n\
        <label>Password <input type=\"password\" name=\"password\" required></label>\n\
        <button type=\"submit\">Sign in</button>\n\
        </form>\n\
        <p>New here? <a href=\"/signup\">Sign up</a></p>\n";
    layout("Sign in", None, content)
}

pub fn create(user: &SessionUser) -> String {
    let content = post_form("New post", "/create", "", "", "Publish");
    layout("New post", Some(user), &content)
}

pub fn edit(post: &Post, user: &SessionUser) -> String {
    let action = format!("/edit/{}", post.blog_id);
    let content = post_form("Edit post", &action, &post.title, &post.body, "Save");
    layout("Edit post", Some(user), &content)
}

fn post_form(heading: &str, action: &str, title: &str, body: &str, submit: &str) -> String {
    format!(
        "<h1>{heading}</h1>\n\
         <form method=\"post\" action=\"{action}\">\n\
         <label>Title <input name=\"title\" value=\"{title}\" required></label>\n\
         <label>Body <textarea name=\"body\" rows=\"12\">{body}</textarea></label>\n\
         <button type=\"submit\">{submit}</button>\n\
         </form>\n",
        action = escape(action),
        title = escape(title),
        body = escape(body),
    )
}

fn byline(post: &Post) -> String {
    format!(
        "<p class=\"byline\">by {name} on <time datetime=\"{iso}\">{date}</time></p>",
        name = escape(&post.creator_name),
        iso = post.date_created.to_rfc3339(),
        date = post.date_created.format("%Y-%m-%d %H:%M"),
    )
}

fn owner_actions(post: &Post) -> String {
    format!(
        "<p class=\"actions\"><a href=\"/edit/{id}\">Edit</a>\n\
         <form method=\"post\" action=\"/delete/{id}\" style=\"display:inline\">\
         <button type=\"submit\">Delete</button></form></p>\n",
        id = post.blog_id,
    )
}

fn layout(title: &str, user: Option<&SessionUser>, content: &str) -> String {
    let nav = match user {
        Some(user) => format!(
            "<a href=\"/\">Home</a> <a href=\"/create\">New post</a> \
             <span>Signed in as {name}</span> \
             <form method=\"post\" action=\"/signout\" style=\"display:inline\">\
             <button type=\"submit\">Sign out</button></form>",
            name = escape(&user.name),
        ),
        None => "<a href=\"/\">Home</a> <a href=\"/signin\">Sign in</a> \
                 <a href=\"/signup\">Sign up</a>"
            .to_string(),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<nav>{nav}</nav>\n<main>\n{content}</main>\n\
         </body>\n</html>\n",
        title = escape(title),
    )
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
