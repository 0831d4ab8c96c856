//! Builds the attachment that carries a relayed message.
//!
//! The transform is pure: the same event, profile and workspace domain always
//! produce the same attachment.

use crate::slack::OutboundAttachment;
use crate::types::{ChannelId, InboundEvent, MessageTs, Profile, UserId};

use super::format::byte_format;

/// Sidebar color for every relayed message.
pub const ATTACHMENT_COLOR: &str = "#36a64f";

/// Builds a permalink-style URL to a message in the source workspace.
///
/// Thread replies get `thread_ts` and `cid` query parameters.
pub fn message_link(
    domain: &str,
    channel: &ChannelId,
    ts: &MessageTs,
    thread: Option<(&MessageTs, Option<&UserId>)>,
) -> String {
    let mut url = format!("https://{domain}.slack.com/archives/{channel}/p{ts}");
    if let Some((thread_ts, cid)) = thread {
        url.push_str(&format!("?thread_ts={thread_ts}"));
        if let Some(cid) = cid {
            url.push_str(&format!("&cid={cid}"));
        }
    }
    url
}

/// Returns the link to `event` in its source channel.
pub fn event_link(domain: &str, event: &InboundEvent) -> String {
    let thread = event.thread_ts.as_ref().map(|thread_ts| {
        let cid = event.parent_user_id.as_ref().or(event.user.as_ref());
        (thread_ts, cid)
    });
    message_link(domain, &event.channel, &event.ts, thread)
}

/// Returns the profile page URL for `user`.
pub fn profile_link(domain: &str, user: &UserId) -> String {
    format!("https://{domain}.slack.com/team/{user}")
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Picks the author name shown for a resolved profile.
///
/// Display name wins over real name; a status emoji is appended when set.
fn author_name(profile: &Profile) -> Option<String> {
    let name = non_empty(profile.display_name.as_deref())
        .or(non_empty(profile.real_name.as_deref()))?;
    Some(match non_empty(profile.status_emoji.as_deref()) {
        Some(emoji) => format!("{name} {emoji}"),
        None => name.to_string(),
    })
}

/// Renders the message body: the text followed by one line per shared file.
fn render_text(event: &InboundEvent) -> String {
    let mut text = event.text.clone().unwrap_or_default();
    for file in &event.files {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&format!(
            "{} (size: {}, mimetype: {}) shared.\n{}",
            file.name,
            byte_format(file.size),
            file.mimetype,
            file.permalink
        ));
    }
    text
}

/// Builds the outbound attachment for `event`.
///
/// `profile` is the author's resolved profile, if any. An unresolved author is
/// shown as a raw mention with no icon, and `author_link` still points at the
/// author's profile page. Events without a `user` get no author block.
pub fn build_attachment(
    event: &InboundEvent,
    profile: Option<&Profile>,
    domain: &str,
) -> OutboundAttachment {
    let footer = format!(
        "Posted in <#{}> @ {}",
        event.channel,
        event_link(domain, event)
    );

    // First image wins
    let image_url = event
        .files
        .iter()
        .find(|file| file.is_image())
        .map(|file| file.permalink.clone());

    let (author_name, author_icon, author_link) = match &event.user {
        Some(user) => {
            let resolved = profile.and_then(|p| author_name(p).map(|name| (name, p)));
            match resolved {
                Some((name, profile)) => (
                    Some(name),
                    non_empty(profile.image_32.as_deref()).map(str::to_string),
                    Some(profile_link(domain, user)),
                ),
                None => (Some(user.mention()), None, Some(profile_link(domain, user))),
            }
        }
        None => (None, None, None),
    };

    OutboundAttachment {
        text: render_text(event),
        color: ATTACHMENT_COLOR.to_string(),
        footer,
        author_name,
        author_icon,
        author_link,
        image_url,
        ts: event.ts.as_seconds(),
    }
}
