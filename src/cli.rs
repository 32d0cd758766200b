use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

use tsync_core::{
    repositories::CommentRepository,
    store::{Entry, SyncStatus},
    tree::CommentTreeNode,
    usecases::Discussion,
    util::rate_limit::RateLimits,
};
use tsync_entities::{
    actor::{Actor, Role},
    context::{ContextKind, DiscussionContext},
    id::Id,
};
use tsync_frontend_api::CommentApi;

use crate::config::Config;

/// Optimistic client of a threaded comment service.
#[derive(Parser)]
#[command(name = "tsync", version, about)]
pub struct Args {
    /// Configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Id of the acting user (read-only guest if omitted)
    #[arg(long, global = true, value_name = "USER_ID")]
    pub actor: Option<String>,

    /// Act with moderator permissions
    #[arg(long, global = true)]
    pub moderator: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the discussion as a tree
    List {
        context: String,
        /// The context is a series instead of a photo
        #[arg(long)]
        series: bool,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Post a comment or a reply
    Post {
        context: String,
        text: String,
        #[arg(long)]
        series: bool,
        /// Reply to this comment
        #[arg(long, value_name = "ID")]
        parent: Option<String>,
    },
    /// Replace the text of an own comment
    Edit {
        context: String,
        id: String,
        text: String,
        #[arg(long)]
        series: bool,
    },
    /// Delete a comment
    Delete {
        context: String,
        id: String,
        #[arg(long)]
        series: bool,
    },
    /// Like or unlike a comment
    Like {
        context: String,
        id: String,
        #[arg(long)]
        series: bool,
    },
}

fn actor(id: Option<String>, moderator: bool) -> Actor {
    match id {
        Some(id) if moderator => Actor::moderator(id),
        Some(id) => Actor::member(id),
        None => Actor {
            id: "guest".into(),
            role: Role::Guest,
        },
    }
}

fn context(id: String, series: bool) -> DiscussionContext {
    let kind = if series {
        ContextKind::Series
    } else {
        ContextKind::Photo
    };
    DiscussionContext::new(kind, id)
}

/// Loads pages until the comment is known.
async fn find_comment(discussion: &Discussion<CommentApi>, id: &Id) -> Result<()> {
    discussion.load_first_page().await?;
    while discussion.store().get(id).is_none() {
        if discussion.load_next_page().await?.is_none() {
            return Err(anyhow!("Comment {id} not found in {}", discussion.context().id()));
        }
    }
    Ok(())
}

fn print_tree(nodes: &[CommentTreeNode<Entry>]) {
    for node in nodes {
        let CommentTreeNode {
            comment: Entry { comment, status },
            children,
            depth,
        } = node;
        let indent = "  ".repeat(*depth);
        let pending = match status {
            SyncStatus::Pending(op) => format!(" ({op} pending)"),
            SyncStatus::Synced => String::new(),
        };
        println!(
            "{indent}[{}] {}: {} (♥ {}, {} replies){pending}",
            comment.id,
            comment.author.display_name,
            comment.content,
            comment.likes_count,
            comment.replies_count,
        );
        print_tree(children);
    }
}

pub async fn run(args: Args, cfg: Config) -> Result<()> {
    let Args {
        actor: actor_id,
        moderator,
        command,
        ..
    } = args;
    let actor = actor(actor_id, moderator);

    let mut api = CommentApi::new(cfg.api.url.clone());
    if let Some(token) = &cfg.api.token {
        api = api.with_token(token.clone());
    }
    let limits = Arc::new(RateLimits::new(
        cfg.rate_limits.comments,
        cfg.rate_limits.replies,
        cfg.rate_limits.likes,
    ));
    let open = |context: DiscussionContext| {
        log::debug!("Opening discussion of {} {}", context.kind(), context.id());
        Discussion::new(
            CommentRepository::new(api.clone()),
            Arc::clone(&limits),
            actor.clone(),
            context,
            cfg.discussion(),
        )
    };

    match command {
        Command::List {
            context: id,
            series,
            pages,
        } => {
            let discussion = open(context(id, series));
            discussion.load_first_page().await?;
            for _ in 1..pages {
                if discussion.load_next_page().await?.is_none() {
                    break;
                }
            }
            print_tree(&discussion.tree());
            let meta = discussion.pagination();
            println!(
                "{} of {} comment(s) loaded{}",
                discussion.comments().len(),
                meta.total,
                if meta.has_next { ", more available" } else { "" }
            );
        }
        Command::Post {
            context: id,
            text,
            series,
            parent,
        } => {
            let discussion = open(context(id, series));
            let created = discussion.post(&text, parent.map(Id::from)).await?;
            println!("Posted comment {}", created.id);
        }
        Command::Edit {
            context: context_id,
            id,
            text,
            series,
        } => {
            let discussion = open(context(context_id, series));
            let id = Id::from(id);
            find_comment(&discussion, &id).await?;
            let edited = discussion.edit(&id, &text).await?;
            println!("Edited comment {}: {}", edited.id, edited.content);
        }
        Command::Delete {
            context: context_id,
            id,
            series,
        } => {
            let discussion = open(context(context_id, series));
            let id = Id::from(id);
            find_comment(&discussion, &id).await?;
            discussion.delete(&id).await?;
            println!("Deleted comment {id}");
        }
        Command::Like {
            context: context_id,
            id,
            series,
        } => {
            let discussion = open(context(context_id, series));
            let id = Id::from(id);
            find_comment(&discussion, &id).await?;
            let liked = discussion.toggle_like(&id).await?;
            println!(
                "Comment {id} is {}",
                if liked { "liked" } else { "no longer liked" }
            );
        }
    }
    Ok(())
}
