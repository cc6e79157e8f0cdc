//! Command implementations for the CLI interface.
//!
//! Each handler resolves what the user typed into ids, builds a reducer
//! [`Command`], dispatches it through the session, and prints the result.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use uuid::Uuid;

use crate::board::Board;
use crate::config::Config;
use crate::db::{create_backup, FileStore};
use crate::error::{Error, Result};
use crate::fields::*;
use crate::reducer::{ColumnPatch, Command, NewTask, Outcome, TaskPatch};
use crate::session::Session;
use crate::task::Task;
use crate::timestamp::{from_local_date, local_date};
use crate::view::{self, Query};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task.
    Add {
        /// Task text.
        content: String,
        /// Column id or title. Defaults to the first column.
        #[arg(long)]
        column: Option<String>,
        /// Zero-based slot in the column. Appends by default.
        #[arg(long)]
        index: Option<usize>,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Comma-separated tags. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Assignee name.
        #[arg(long)]
        assign: Option<String>,
        /// Cover image URL.
        #[arg(long)]
        cover: Option<String>,
    },

    /// Update fields on a task.
    Update {
        /// Task id, id prefix or exact text.
        task: String,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        due: Option<String>,
        /// Replace the tag list. Comma-separated, may be repeated.
        #[arg(long = "tags")]
        tags: Option<Vec<String>>,
        #[arg(long)]
        assign: Option<String>,
        #[arg(long)]
        cover: Option<String>,
        /// Mark completed.
        #[arg(long, conflicts_with = "undone")]
        done: bool,
        /// Mark not completed.
        #[arg(long)]
        undone: bool,
        #[arg(long, conflicts_with = "desc")]
        clear_desc: bool,
        #[arg(long, conflicts_with = "priority")]
        clear_priority: bool,
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        #[arg(long, conflicts_with = "assign")]
        unassign: bool,
        #[arg(long, conflicts_with = "cover")]
        clear_cover: bool,
    },

    /// Move a task to another column or position.
    Move {
        /// Task id, id prefix or exact text.
        task: String,
        /// Destination column id or title.
        column: String,
        /// Zero-based slot in the destination. Appends by default.
        #[arg(long)]
        index: Option<usize>,
    },

    /// Delete a task.
    Delete {
        /// Task id, id prefix or exact text.
        task: String,
    },

    /// Hide a task from the board without deleting it.
    Archive { task: String },

    /// Bring an archived task back.
    Restore { task: String },

    /// Manage tags on a task.
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage a task's comments.
    Comment {
        #[command(subcommand)]
        action: CommentAction,
    },

    /// Manage a task's checklist.
    Check {
        #[command(subcommand)]
        action: CheckAction,
    },

    /// Manage columns.
    Column {
        #[command(subcommand)]
        action: ColumnAction,
    },

    /// Show the board, filtered and sorted.
    List {
        /// Only this column (id or title).
        #[arg(long)]
        column: Option<String>,
        /// Case-insensitive search over text, description and tags.
        #[arg(long)]
        text: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, conflicts_with = "unassigned")]
        assignee: Option<String>,
        /// Only tasks nobody is assigned to.
        #[arg(long)]
        unassigned: bool,
        #[arg(long)]
        hide_completed: bool,
        /// Hide tasks that have an assignee.
        #[arg(long)]
        hide_assigned: bool,
        #[arg(long, value_enum)]
        due: Option<DueFilter>,
        #[arg(long, value_enum)]
        sort: Option<SortKey>,
        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Include archived tasks.
        #[arg(long)]
        archived: bool,
    },

    /// Show one task in full.
    Show { task: String },

    /// List tags with usage counts.
    Tags,

    /// Report broken references between tasks and columns.
    CheckIntegrity,

    /// Apply a raw JSON command ("-" reads stdin).
    Apply { json: String },

    /// Write a JSON snapshot of the board.
    Export {
        /// Output path. Defaults to kanban-backup-<date>.json.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Replace the board with a JSON snapshot.
    Import {
        input: PathBuf,
        /// Skip the automatic backup of the current board.
        #[arg(long)]
        no_backup: bool,
    },

    /// Copy the board file into the backup directory.
    Backup,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TagAction {
    Add { task: String, tag: String },
    Rm { task: String, tag: String },
}

#[derive(Subcommand)]
pub enum CommentAction {
    Add {
        task: String,
        text: String,
        /// Defaults to the configured author.
        #[arg(long)]
        author: Option<String>,
    },
    /// Remove a comment by id or 1-based number.
    Rm { task: String, comment: String },
}

#[derive(Subcommand)]
pub enum CheckAction {
    Add { task: String, text: String },
    /// Flip an item by id or 1-based number.
    Toggle { task: String, item: String },
    Rm { task: String, item: String },
}

#[derive(Subcommand)]
pub enum ColumnAction {
    Add {
        title: String,
        #[arg(long)]
        color: Option<String>,
        /// Work-in-progress limit; 0 means none.
        #[arg(long)]
        wip: Option<u32>,
    },
    Update {
        column: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, conflicts_with = "color")]
        clear_color: bool,
        /// Work-in-progress limit; 0 removes it.
        #[arg(long)]
        wip: Option<u32>,
    },
    /// Delete a column and every task in it.
    Delete {
        column: String,
        /// Confirm the cascade.
        #[arg(long)]
        yes: bool,
    },
    /// Move a column to a zero-based position.
    Move { column: String, index: usize },
}

/// Run one CLI command against the board stored under `config`.
pub fn run(command: Commands, config: &Config) -> Result<()> {
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return Ok(());
    }
    let db_path = config.state_path();
    let mut session = Session::open(FileStore::new(&db_path));

    match command {
        Commands::Add { content, column, index, desc, priority, due, tags, assign, cover } => {
            cmd_add(&mut session, content, column, index, desc, priority, due, tags, assign, cover)
        }
        Commands::Update {
            task, content, desc, priority, due, tags, assign, cover, done, undone,
            clear_desc, clear_priority, clear_due, unassign, clear_cover,
        } => {
            let task_id = resolve_task(session.board(), &task)?;
            let patch = TaskPatch {
                task_id: task_id.clone(),
                content,
                description: patch_field(desc, clear_desc),
                priority: patch_field(priority, clear_priority),
                due_date: match due {
                    Some(s) => Some(Some(parse_due(&s)?)),
                    None if clear_due => Some(None),
                    None => None,
                },
                tags: tags.map(|t| split_and_normalise_tags(&t)),
                assigned_to: patch_field(assign, unassign),
                cover_image: patch_field(cover, clear_cover),
                completed: if done { Some(true) } else if undone { Some(false) } else { None },
            };
            report(dispatch(&mut session, Command::UpdateTask(patch))?, &format!("Updated task {}", short(&task_id)));
            Ok(())
        }
        Commands::Move { task, column, index } => cmd_move(&mut session, &task, &column, index),
        Commands::Delete { task } => {
            let task_id = resolve_task(session.board(), &task)?;
            report(dispatch(&mut session, Command::DeleteTask { task_id: task_id.clone() })?, &format!("Deleted task {}", short(&task_id)));
            Ok(())
        }
        Commands::Archive { task } => {
            let task_id = resolve_task(session.board(), &task)?;
            report(dispatch(&mut session, Command::ArchiveTask { task_id: task_id.clone() })?, &format!("Archived task {}", short(&task_id)));
            Ok(())
        }
        Commands::Restore { task } => {
            let task_id = resolve_task(session.board(), &task)?;
            report(dispatch(&mut session, Command::RestoreTask { task_id: task_id.clone() })?, &format!("Restored task {}", short(&task_id)));
            Ok(())
        }
        Commands::Tag { action } => cmd_tag(&mut session, action),
        Commands::Comment { action } => cmd_comment(&mut session, action, &config.settings.author),
        Commands::Check { action } => cmd_check(&mut session, action),
        Commands::Column { action } => cmd_column(&mut session, action),
        Commands::List {
            column, text, priority, tag, assignee, unassigned, hide_completed,
            hide_assigned, due, sort, desc, archived,
        } => {
            let query = Query {
                text: text.unwrap_or_default(),
                priority,
                tag,
                assignee: match (assignee, unassigned) {
                    (Some(name), _) => AssigneeFilter::Named(name),
                    (None, true) => AssigneeFilter::Unassigned,
                    (None, false) => AssigneeFilter::Any,
                },
                show_completed: !hide_completed,
                show_assigned: !hide_assigned,
                due,
                sort,
                direction: if desc { SortDirection::Desc } else { SortDirection::Asc },
                include_archived: archived,
            };
            cmd_list(session.board(), column.as_deref(), &query)
        }
        Commands::Show { task } => cmd_show(session.board(), &task),
        Commands::Tags => {
            cmd_tags(session.board());
            Ok(())
        }
        Commands::CheckIntegrity => cmd_check_integrity(session.board()),
        Commands::Apply { json } => cmd_apply(&mut session, &json),
        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| config.export_path(Local::now().date_naive()));
            cmd_export(&session, &path)
        }
        Commands::Import { input, no_backup } => cmd_import(&mut session, &db_path, &input, no_backup),
        Commands::Backup => {
            let path = create_backup(&db_path)?;
            println!("Backup created: {}", path.display());
            Ok(())
        }
        Commands::Completions { .. } => unreachable!("completions handled above"),
    }
}

/// Dispatch and turn a rejection into an error.
fn dispatch(session: &mut Session<FileStore>, command: Command) -> Result<Outcome> {
    match session.dispatch(command)? {
        Outcome::Rejected(why) => Err(Error::Rejected(why)),
        outcome => Ok(outcome),
    }
}

fn report(outcome: Outcome, message: &str) {
    match outcome {
        Outcome::Applied => println!("{message}"),
        _ => println!("Nothing to change."),
    }
}

fn patch_field<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    match value {
        Some(v) => Some(Some(v)),
        None if clear => Some(None),
        None => None,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    session: &mut Session<FileStore>,
    content: String,
    column: Option<String>,
    index: Option<usize>,
    desc: Option<String>,
    priority: Option<Priority>,
    due: Option<String>,
    tags: Vec<String>,
    assign: Option<String>,
    cover: Option<String>,
) -> Result<()> {
    let board = session.board();
    let column_id = match column {
        Some(c) => resolve_column(board, &c)?,
        None => board
            .ordered_columns()
            .next()
            .map(|c| c.id.clone())
            .ok_or_else(|| Error::ColumnNotFound("board has no columns".into()))?,
    };
    let due_date = due.as_deref().map(parse_due).transpose()?;
    let id = Uuid::new_v4().to_string();
    let new = NewTask {
        column_id,
        content,
        id: Some(id.clone()),
        index,
        description: desc.filter(|d| !d.trim().is_empty()),
        priority,
        due_date,
        tags: split_and_normalise_tags(&tags),
        assigned_to: assign,
        cover_image: cover,
    };
    dispatch(session, Command::AddTask(new))?;
    println!("Added task {}", short(&id));
    Ok(())
}

pub fn cmd_move(session: &mut Session<FileStore>, task: &str, column: &str, index: Option<usize>) -> Result<()> {
    let board = session.board();
    let task_id = resolve_task(board, task)?;
    let dest = resolve_column(board, column)?;
    let source = board.tasks[&task_id].column_id.clone();
    let source_index = board
        .column(&source)
        .and_then(|c| c.position_of(&task_id))
        .ok_or_else(|| Error::TaskNotFound(format!("{task_id} is not listed in its column")))?;
    let dest_len = board.column(&dest).map_or(0, |c| c.task_ids.len());
    let destination_index = match index {
        Some(i) => i,
        None if dest == source => dest_len.saturating_sub(1),
        None => dest_len,
    };
    let outcome = dispatch(
        session,
        Command::MoveTask {
            task_id: task_id.clone(),
            source_column_id: source,
            source_index,
            destination_column_id: dest.clone(),
            destination_index,
        },
    )?;
    let title = session.board().column(&dest).map_or(dest.as_str(), |c| c.title.as_str()).to_string();
    report(outcome, &format!("Moved task {} to {}", short(&task_id), title));
    Ok(())
}

pub fn cmd_tag(session: &mut Session<FileStore>, action: TagAction) -> Result<()> {
    let (task, tag, adding) = match action {
        TagAction::Add { task, tag } => (task, tag, true),
        TagAction::Rm { task, tag } => (task, tag, false),
    };
    let task_id = resolve_task(session.board(), &task)?;
    let tag = normalise_tag(&tag);
    let command = if adding {
        Command::AddTag { task_id: task_id.clone(), tag: tag.clone() }
    } else {
        Command::RemoveTag { task_id: task_id.clone(), tag: tag.clone() }
    };
    let verb = if adding { "Tagged" } else { "Untagged" };
    report(dispatch(session, command)?, &format!("{verb} {} with {tag}", short(&task_id)));
    Ok(())
}

pub fn cmd_comment(session: &mut Session<FileStore>, action: CommentAction, default_author: &str) -> Result<()> {
    match action {
        CommentAction::Add { task, text, author } => {
            let task_id = resolve_task(session.board(), &task)?;
            let author = author.unwrap_or_else(|| default_author.to_string());
            let command = Command::AddComment { task_id: task_id.clone(), text, author };
            report(dispatch(session, command)?, &format!("Commented on {}", short(&task_id)));
        }
        CommentAction::Rm { task, comment } => {
            let task_id = resolve_task(session.board(), &task)?;
            let ids: Vec<&str> = session.board().tasks[&task_id].comments.iter().map(|c| c.id.as_str()).collect();
            let comment_id = resolve_item(&ids, &comment)?;
            let command = Command::DeleteComment { task_id: task_id.clone(), comment_id };
            report(dispatch(session, command)?, &format!("Removed comment from {}", short(&task_id)));
        }
    }
    Ok(())
}

pub fn cmd_check(session: &mut Session<FileStore>, action: CheckAction) -> Result<()> {
    let item_ids = |session: &Session<FileStore>, task_id: &str| -> Vec<String> {
        session.board().tasks[task_id].checklist.iter().map(|i| i.id.clone()).collect()
    };
    match action {
        CheckAction::Add { task, text } => {
            let task_id = resolve_task(session.board(), &task)?;
            let command = Command::AddChecklistItem { task_id: task_id.clone(), text };
            report(dispatch(session, command)?, &format!("Added checklist item to {}", short(&task_id)));
        }
        CheckAction::Toggle { task, item } => {
            let task_id = resolve_task(session.board(), &task)?;
            let ids = item_ids(session, &task_id);
            let item_id = resolve_item(&ids.iter().map(String::as_str).collect::<Vec<_>>(), &item)?;
            let command = Command::ToggleChecklistItem { task_id: task_id.clone(), item_id };
            report(dispatch(session, command)?, &format!("Toggled checklist item on {}", short(&task_id)));
        }
        CheckAction::Rm { task, item } => {
            let task_id = resolve_task(session.board(), &task)?;
            let ids = item_ids(session, &task_id);
            let item_id = resolve_item(&ids.iter().map(String::as_str).collect::<Vec<_>>(), &item)?;
            let command = Command::DeleteChecklistItem { task_id: task_id.clone(), item_id };
            report(dispatch(session, command)?, &format!("Removed checklist item from {}", short(&task_id)));
        }
    }
    Ok(())
}

pub fn cmd_column(session: &mut Session<FileStore>, action: ColumnAction) -> Result<()> {
    match action {
        ColumnAction::Add { title, color, wip } => {
            let command = Command::AddColumn { id: None, title: title.clone(), color, wip };
            report(dispatch(session, command)?, &format!("Added column {title}"));
        }
        ColumnAction::Update { column, title, color, clear_color, wip } => {
            let column_id = resolve_column(session.board(), &column)?;
            let patch = ColumnPatch {
                column_id,
                title,
                color: patch_field(color, clear_color),
                wip: wip.map(Some),
            };
            report(dispatch(session, Command::UpdateColumn(patch))?, &format!("Updated column {column}"));
        }
        ColumnAction::Delete { column, yes } => {
            let column_id = resolve_column(session.board(), &column)?;
            let count = session.board().column(&column_id).map_or(0, |c| c.task_ids.len());
            if !yes {
                return Err(Error::InvalidArgument(format!(
                    "deleting column {column} also deletes its {count} task(s); pass --yes to confirm"
                )));
            }
            report(
                dispatch(session, Command::DeleteColumn { column_id })?,
                &format!("Deleted column {column} and {count} task(s)"),
            );
        }
        ColumnAction::Move { column, index } => {
            let column_id = resolve_column(session.board(), &column)?;
            let command = Command::ReorderColumn { column_id, destination_index: index };
            report(dispatch(session, command)?, &format!("Moved column {column} to position {index}"));
        }
    }
    Ok(())
}

pub fn cmd_list(board: &Board, column: Option<&str>, query: &Query) -> Result<()> {
    let only = column.map(|c| resolve_column(board, c)).transpose()?;
    let today = view::today();
    for col in view::board_view(board, query, today) {
        if only.as_deref().is_some_and(|id| id != col.column.id) {
            continue;
        }
        let limit = col.column.wip.map(|w| format!("/{w}")).unwrap_or_default();
        println!("== {} ({}{}) ==", col.column.title, col.total, limit);
        print_table(&col.tasks, today);
        println!();
    }
    Ok(())
}

pub fn cmd_show(board: &Board, task: &str) -> Result<()> {
    let task_id = resolve_task(board, task)?;
    let task = &board.tasks[&task_id];
    let today = view::today();
    let column = board.column(&task.column_id).map_or("-", |c| c.title.as_str());
    println!("ID:           {}", task.id);
    println!("Content:      {}", task.content);
    println!("Column:       {}", column);
    println!("Priority:     {}", format_priority(task.priority));
    println!("Due:          {}", match task.due_date {
        Some(d) => format!("{} ({})", local_date(d), format_due_relative(Some(d), today)),
        None => "-".into(),
    });
    println!("Assignee:     {}", task.assigned_to.as_deref().unwrap_or("-"));
    println!("Tags:         {}", if task.tags.is_empty() { "-".into() } else { task.tags.join(",") });
    println!("Completed:    {}", if task.completed { "yes" } else { "no" });
    println!("Archived:     {}", if task.is_archived { "yes" } else { "no" });
    if let Some(cover) = &task.cover_image {
        println!("Cover:        {}", cover);
    }
    println!("Created UTC:  {}", task.created_at.to_rfc3339());
    println!("Updated UTC:  {}", task.updated_at.to_rfc3339());
    println!("Description:\n{}\n", task.description.as_deref().unwrap_or("-"));

    let (done, total) = task.checklist_progress();
    println!("Checklist ({done}/{total}):");
    for (i, item) in task.checklist.iter().enumerate() {
        println!("  {}. [{}] {}", i + 1, if item.is_complete { "x" } else { " " }, item.text);
    }
    println!("Comments:");
    for (i, c) in task.comments.iter().enumerate() {
        println!("  {}. {} ({}): {}", i + 1, c.author, c.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"), c.text);
    }
    Ok(())
}

pub fn cmd_tags(board: &Board) {
    println!("{:<16} {}", "Tag", "Count");
    for tag in view::all_tags(board) {
        let count = board.tasks.values().filter(|t| t.has_tag(&tag)).count();
        println!("{:<16} {}", truncate(&tag, 16), count);
    }
}

pub fn cmd_check_integrity(board: &Board) -> Result<()> {
    let violations = board.audit();
    if violations.is_empty() {
        println!("Board is consistent.");
        return Ok(());
    }
    for v in &violations {
        println!("- {v}");
    }
    Err(Error::Format(format!("{} integrity violation(s)", violations.len())))
}

pub fn cmd_apply(session: &mut Session<FileStore>, json: &str) -> Result<()> {
    let raw = if json == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        json.to_string()
    };
    let command: Command = serde_json::from_str(&raw)?;
    let name = command.name();
    report(dispatch(session, command)?, &format!("Applied {name}"));
    Ok(())
}

pub fn cmd_export(session: &Session<FileStore>, path: &Path) -> Result<()> {
    let data = session.export()?;
    fs::write(path, data)?;
    println!(
        "Exported {} task(s) in {} column(s) to {}",
        session.board().tasks.len(),
        session.board().columns.len(),
        path.display()
    );
    Ok(())
}

pub fn cmd_import(session: &mut Session<FileStore>, db_path: &Path, input: &Path, no_backup: bool) -> Result<()> {
    let data = fs::read(input)?;
    if !no_backup && db_path.exists() {
        let backup = create_backup(db_path)?;
        println!("Created backup: {}", backup.display());
    }
    session.import(&data)?;
    println!(
        "Imported {} task(s) in {} column(s).",
        session.board().tasks.len(),
        session.board().columns.len()
    );
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

/// Resolve a task identifier: full id, unique id prefix, or exact text (case-insensitive).
pub fn resolve_task(board: &Board, identifier: &str) -> Result<String> {
    if board.tasks.contains_key(identifier) {
        return Ok(identifier.to_string());
    }
    let by_prefix: Vec<&Task> = board.tasks.values().filter(|t| t.id.starts_with(identifier)).collect();
    if by_prefix.len() == 1 {
        return Ok(by_prefix[0].id.clone());
    }
    let by_text: Vec<&Task> = board
        .tasks
        .values()
        .filter(|t| t.content.to_lowercase() == identifier.to_lowercase())
        .collect();
    let matches = if by_text.is_empty() { by_prefix } else { by_text };
    match matches.len() {
        0 => Err(Error::TaskNotFound(identifier.to_string())),
        1 => Ok(matches[0].id.clone()),
        _ => {
            let mut msg = format!("Multiple tasks match '{}':\n", identifier);
            for t in matches {
                msg.push_str(&format!("  {}: {}\n", short(&t.id), t.content));
            }
            msg.push_str("Please use a longer id instead.");
            Err(Error::Ambiguous(msg))
        }
    }
}

/// Resolve a column identifier: id or title (case-insensitive).
pub fn resolve_column(board: &Board, identifier: &str) -> Result<String> {
    if board.columns.contains_key(identifier) {
        return Ok(identifier.to_string());
    }
    let matches: Vec<&str> = board
        .ordered_columns()
        .filter(|c| c.title.to_lowercase() == identifier.to_lowercase())
        .map(|c| c.id.as_str())
        .collect();
    match matches.as_slice() {
        [] => Err(Error::ColumnNotFound(identifier.to_string())),
        [id] => Ok(id.to_string()),
        _ => Err(Error::Ambiguous(format!(
            "Multiple columns are titled '{}'; use the column id instead.",
            identifier
        ))),
    }
}

/// Resolve a checklist item or comment by id, id prefix or 1-based number.
fn resolve_item(ids: &[&str], identifier: &str) -> Result<String> {
    if let Ok(n) = identifier.parse::<usize>() {
        if let Some(id) = n.checked_sub(1).and_then(|i| ids.get(i)) {
            return Ok(id.to_string());
        }
    }
    let matches: Vec<&&str> = ids.iter().filter(|id| id.starts_with(identifier)).collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(Error::InvalidArgument(format!("no item matches '{identifier}'"))),
        _ => Err(Error::Ambiguous(format!("'{identifier}' matches several items"))),
    }
}

/// Normalize a tag string by trimming, lowercasing, and replacing spaces with hyphens.
pub fn normalise_tag(s: &str) -> String {
    s.trim().to_lowercase().replace(' ', "-")
}

/// Split comma-separated tag strings and normalize each tag, keeping first-seen order.
pub fn split_and_normalise_tags(inputs: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for raw in inputs {
        for part in raw.split(',') {
            let tag = normalise_tag(part);
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Parse due date input: "today", "tomorrow", "yesterday", "in Nd", "in Nw", or YYYY-MM-DD.
pub fn parse_due(s: &str) -> Result<DateTime<Utc>> {
    parse_due_input(s, Local::now().date_naive())
        .map(from_local_date)
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "unrecognised due date '{s}'. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'."
            ))
        })
}

fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let shift = |delta: Option<TimeDelta>| delta.and_then(|d| today.checked_add_signed(d));
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return shift(TimeDelta::try_days(1)),
        "yesterday" => return shift(TimeDelta::try_days(-1)),
        _ => {}
    }
    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(days) = rest.strip_suffix('d').and_then(|n| n.trim().parse::<i64>().ok()) {
            return shift(TimeDelta::try_days(days));
        }
        if let Some(weeks) = rest.strip_suffix('w').and_then(|n| n.trim().parse::<i64>().ok()) {
            return shift(TimeDelta::try_weeks(weeks));
        }
        return None;
    }
    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<DateTime<Utc>>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (local_date(d) - today).num_days();
            match delta {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}

pub fn format_priority(p: Option<Priority>) -> &'static str {
    match p {
        Some(Priority::High) => "High",
        Some(Priority::Medium) => "Medium",
        Some(Priority::Low) => "Low",
        None => "-",
    }
}

/// First eight characters of an id, for display.
pub fn short(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(i, _)| &id[..i])
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task], today: NaiveDate) {
    println!("{:<9} {:<7} {:<10} {:<12} {}", "ID", "Pri", "Due", "Assignee", "Task [tags]");
    for t in tasks {
        let tags = if t.tags.is_empty() { String::new() } else { format!(" [{}]", t.tags.join(",")) };
        let mut flags = String::new();
        if t.completed {
            flags.push_str(" (done)");
        }
        if t.is_archived {
            flags.push_str(" (archived)");
        }
        let (done, total) = t.checklist_progress();
        if total > 0 {
            flags.push_str(&format!(" {done}/{total}"));
        }
        println!(
            "{:<9} {:<7} {:<10} {:<12} {}{}{}",
            short(&t.id),
            format_priority(t.priority),
            format_due_relative(t.due_date, today),
            truncate(t.assigned_to.as_deref().unwrap_or("-"), 12),
            t.content,
            tags,
            flags
        );
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}
