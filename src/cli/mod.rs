use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use futures::executor::block_on;

use crate::{
    config,
    domain::{
        entry::{CatalogEntry, MediaKind},
        media::{MediaFileId, MediaType},
        metadata::{ArtistRole, MusicMetadata, VideoMetadata},
    },
    draft::{AlbumDraft, SingleDraft, VideoDraft},
    publish::encoding::Base64Encoder,
    review::ReviewSnapshot,
    session::{ActiveTab, EditTarget},
    storage::{db::i64_seconds_to_local_time, fs, operations::Storage},
    workspace::Workspace,
};

#[derive(Parser)]
#[command(name = "releasedeck")]
#[command(version = "0.1")]
#[command(about = "Draft, review and publish singles, albums and videos")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "releasedeck.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show catalog and draft status
    Status,
    /// Edit the draft of a single, album or video
    Draft {
        #[command(subcommand)]
        draft: DraftCommand,
    },
    /// Load a published entry into its draft for editing
    Edit {
        /// single (or mix), album or video
        #[arg(required_unless_present = "query", requires = "id")]
        kind: Option<MediaKind>,
        id: Option<String>,
        /// Navigation query instead of KIND ID, e.g. "albumId=42"
        #[arg(long, conflicts_with_all = ["kind", "id"])]
        query: Option<String>,
    },
    /// Show what would be published
    Review { kind: MediaKind },
    /// Publish a draft to the catalog
    Publish {
        kind: MediaKind,
        /// Replace the catalog entry with this id instead of creating a new one
        #[arg(long)]
        edit: Option<String>,
    },
    /// Discard a draft
    Reset { kind: MediaKind },
    /// List published entries
    List {
        #[arg(short, long)]
        kind: Option<MediaKind>,
    },
    /// Show one published entry
    Show { id: String },
    /// Write the files of a published entry to a directory
    Export {
        id: String,
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Run http server exposing the catalog
    Serve,
}

#[derive(Subcommand)]
pub enum DraftCommand {
    Single(SingleArgs),
    Album(AlbumArgs),
    Video(VideoArgs),
}

#[derive(Args, Default)]
pub struct MusicArgs {
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub release_type: Option<String>,
    #[arg(long)]
    pub unlock_cost: Option<String>,
    #[arg(long)]
    pub sponsorship: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
}

#[derive(Args, Default)]
pub struct SingleArgs {
    /// Audio file of the single
    #[arg(long)]
    pub track: Option<PathBuf>,
    #[arg(long)]
    pub cover: Option<PathBuf>,
    #[arg(long)]
    pub title: Option<String>,
    /// Feature artist, may be repeated
    #[arg(long)]
    pub credit: Vec<String>,
    #[arg(long)]
    pub clear_credits: bool,
    #[arg(long)]
    pub remove_track: bool,
    #[arg(long)]
    pub remove_cover: bool,
    #[command(flatten)]
    pub music: MusicArgs,
}

#[derive(Args, Default)]
pub struct AlbumArgs {
    /// Add every audio file under this directory as a track, in path order
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Audio file to add as a track, may be repeated
    #[arg(long)]
    pub track: Vec<PathBuf>,
    #[arg(long)]
    pub cover: Option<PathBuf>,
    #[arg(long)]
    pub title: Option<String>,
    /// Album artist as NAME or NAME:ROLE, may be repeated
    #[arg(long, value_parser = parse_artist)]
    pub artist: Vec<(String, ArtistRole)>,
    /// FILE_ID=TITLE
    #[arg(long, value_parser = parse_pair)]
    pub track_title: Vec<(String, String)>,
    /// FILE_ID=NAME, adds a feature artist to a track
    #[arg(long, value_parser = parse_pair)]
    pub track_artist: Vec<(String, String)>,
    /// FILE_ID=INDEX
    #[arg(long, value_parser = parse_pair)]
    pub move_track: Vec<(String, String)>,
    #[arg(long)]
    pub remove_track: Vec<String>,
    #[command(flatten)]
    pub music: MusicArgs,
}

#[derive(Args, Default)]
pub struct VideoArgs {
    #[arg(long)]
    pub video: Option<PathBuf>,
    /// Thumbnail image, may be repeated
    #[arg(long)]
    pub thumbnail: Vec<PathBuf>,
    /// File id of the thumbnail to show
    #[arg(long)]
    pub select_thumbnail: Option<String>,
    #[arg(long)]
    pub remove_thumbnail: Vec<String>,
    #[arg(long)]
    pub title: Option<String>,
    /// Link to a track used in the video, may be repeated
    #[arg(long)]
    pub link: Vec<String>,
    #[arg(long)]
    pub release_type: Option<String>,
    #[arg(long)]
    pub unlock_cost: Option<String>,
    #[arg(long)]
    pub sponsorship: Option<String>,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn parse_artist(s: &str) -> anyhow::Result<(String, ArtistRole)> {
    match s.rsplit_once(':') {
        Some((name, role)) => Ok((name.to_string(), role.parse()?)),
        None => Ok((s.to_string(), ArtistRole::Primary)),
    }
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let cfg = config::Config::load(&cli.config)?;

    match cli.command {
        Commands::Status => {
            let ws = open_workspace(&cfg)?;
            let catalog = ws.catalog();
            match catalog.last_published_at()? {
                Some(at) => println!(
                    "Catalog contains {} entries, last published {}",
                    catalog.count_entries()?,
                    i64_seconds_to_local_time(at)?
                ),
                None => println!("Catalog is empty"),
            }
            for kind in MediaKind::ALL {
                let state = if ws.drafts().is_empty(kind) {
                    "empty"
                } else {
                    "in progress"
                };
                println!("  {kind} draft: {state}");
            }
        }

        Commands::Draft { draft } => {
            let mut ws = open_workspace(&cfg)?;
            let kind = match draft {
                DraftCommand::Single(args) => {
                    apply_single(ws.drafts_mut().single_mut(), &args)?;
                    MediaKind::Single
                }
                DraftCommand::Album(args) => {
                    apply_album(ws.drafts_mut().album_mut(), &args)?;
                    MediaKind::Album
                }
                DraftCommand::Video(args) => {
                    apply_video(ws.drafts_mut().video_mut(), &args)?;
                    MediaKind::Video
                }
            };
            ws.save_drafts()?;
            print_snapshot(&crate::review::project(ws.drafts(), kind))?;
        }

        Commands::Edit { kind, id, query } => {
            let target = edit_target(kind, id, query.as_deref())?;
            let (kind, id) = (target.kind(), target.id().to_string());
            let mut ws = open_workspace(&cfg)?;
            ws.open_session(Some(target))?;
            ws.save_drafts()?;
            println!("{kind} draft now edits {id}; publish with: publish {kind} --edit {id}");
        }

        Commands::Review { kind } => {
            let mut ws = open_workspace(&cfg)?;
            ws.select_tab(ActiveTab::for_kind(kind));
            print_snapshot(ws.continue_to_review())?;
        }

        Commands::Publish { kind, edit } => {
            let mut ws = open_workspace(&cfg)?;
            ws.continue_session(edit.map(|id| EditTarget::for_kind(kind, id)));
            // an edit session already sits on this kind's tab
            ws.select_tab(ActiveTab::for_kind(kind));
            ws.continue_to_review();

            let entry = block_on(ws.publish(&Base64Encoder))
                .with_context(|| format!("Failed to publish {kind} draft"))?;
            ws.save_drafts()?;

            println!("Published {} {} \"{}\"", entry.kind(), entry.id(), entry.title());
        }

        Commands::Reset { kind } => {
            let mut ws = open_workspace(&cfg)?;
            ws.drafts_mut().reset(kind);
            ws.save_drafts()?;
            println!("{kind} draft discarded");
        }

        Commands::List { kind } => {
            let storage = Storage::new(&cfg.database)?;
            let entries = match kind {
                Some(kind) => storage.list_entries_of(kind)?,
                None => storage.list_entries()?,
            };
            for entry in &entries {
                println!(
                    "{} [{}] \"{}\" released {}, {} files",
                    entry.id(),
                    entry.kind(),
                    entry.title(),
                    entry.info().release_date.format("%Y-%m-%d"),
                    entry.files().len()
                );
            }
        }

        Commands::Show { id } => {
            let storage = Storage::new(&cfg.database)?;
            print_entry(&storage.get_entry(&id)?);
        }

        Commands::Export { id, out } => {
            let storage = Storage::new(&cfg.database)?;
            let entry = storage.get_entry(&id)?;
            let written = export_entry(&entry, &out)?;
            println!("Exported {} files to {}", written.len(), out.to_string_lossy());
            for path in &written {
                println!("    - {}", path.to_string_lossy());
            }
        }

        Commands::Serve => {
            println!("Starting HTTP server...");

            let storage = Storage::new(&cfg.database)?;
            let http_server = crate::http::server::HttpServer::new(storage, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }
    }

    Ok(())
}

fn edit_target(
    kind: Option<MediaKind>,
    id: Option<String>,
    query: Option<&str>,
) -> anyhow::Result<EditTarget> {
    match (query, kind, id) {
        (Some(query), _, _) => EditTarget::from_query(query)
            .with_context(|| format!("no mixId, albumId or videoId in '{query}'")),
        (None, Some(kind), Some(id)) => Ok(EditTarget::for_kind(kind, id)),
        _ => anyhow::bail!("give either KIND ID or --query"),
    }
}

fn open_workspace(cfg: &config::Config) -> anyhow::Result<Workspace> {
    let storage = Storage::new(&cfg.database)?;
    let drafts = storage.load_drafts()?;
    Ok(Workspace::with_drafts(storage, drafts).with_publish_config(&cfg.publish))
}

fn apply_music_metadata(metadata: &mut MusicMetadata, args: &MusicArgs) {
    if let Some(genre) = &args.genre {
        metadata.genre.select(genre.as_str());
    }
    if let Some(release_type) = &args.release_type {
        metadata.release_type.select(release_type.as_str());
    }
    if let Some(cost) = &args.unlock_cost {
        metadata.unlock_cost.select(cost.as_str());
    }
    if let Some(sponsorship) = &args.sponsorship {
        metadata.allow_sponsorship.select(sponsorship.as_str());
    }
    if let Some(year) = &args.year {
        metadata.release_year = year.clone();
    }
}

fn apply_video_metadata(metadata: &mut VideoMetadata, args: &VideoArgs) {
    if let Some(release_type) = &args.release_type {
        metadata.release_type.select(release_type.as_str());
    }
    if let Some(cost) = &args.unlock_cost {
        metadata.unlock_cost.select(cost.as_str());
    }
    if let Some(sponsorship) = &args.sponsorship {
        metadata.allow_sponsorship.select(sponsorship.as_str());
    }
}

pub fn apply_single(draft: &mut SingleDraft, args: &SingleArgs) -> anyhow::Result<()> {
    if args.remove_track {
        draft.remove_track();
    }
    if args.remove_cover {
        draft.remove_cover_art();
    }
    if let Some(path) = &args.track {
        draft.set_track(fs::select_file(path, MediaType::Audio)?);
    }
    if let Some(path) = &args.cover {
        draft.set_cover_art(fs::select_file(path, MediaType::Image)?);
    }
    if let Some(title) = &args.title {
        draft.set_title(title.as_str());
    }
    if args.clear_credits {
        while !draft.credits().is_empty() {
            draft.remove_credit(0);
        }
    }
    for credit in &args.credit {
        draft.add_credit(credit.as_str());
    }
    apply_music_metadata(draft.metadata_mut(), &args.music);
    Ok(())
}

pub fn apply_album(draft: &mut AlbumDraft, args: &AlbumArgs) -> anyhow::Result<()> {
    for id in &args.remove_track {
        draft.remove_track(&MediaFileId::from(id.as_str()));
    }

    if let Some(dir) = &args.dir {
        let paths = fs::scan_dir(dir, MediaType::Audio, false);
        if paths.is_empty() {
            log::warn!("no audio files found under {}", dir.to_string_lossy());
        }
        for path in &paths {
            add_album_track(draft, path)?;
        }
    }
    for path in &args.track {
        add_album_track(draft, path)?;
    }

    if let Some(path) = &args.cover {
        draft.set_cover_art(fs::select_file(path, MediaType::Image)?);
    }
    if let Some(title) = &args.title {
        draft.set_title(title.as_str());
    }
    for (name, role) in &args.artist {
        draft.add_primary_artist(name.as_str(), *role);
    }
    for (id, title) in &args.track_title {
        draft.set_track_title(&MediaFileId::from(id.as_str()), title.as_str());
    }
    for (id, name) in &args.track_artist {
        draft.add_track_artist(&MediaFileId::from(id.as_str()), name.as_str());
    }
    for (id, index) in &args.move_track {
        let index: usize = index
            .parse()
            .with_context(|| format!("invalid track position '{index}'"))?;
        draft.move_track(&MediaFileId::from(id.as_str()), index);
    }
    apply_music_metadata(draft.metadata_mut(), &args.music);
    Ok(())
}

/// Adds a track titled after its file name.
fn add_album_track(draft: &mut AlbumDraft, path: &Path) -> anyhow::Result<()> {
    let file = fs::select_file(path, MediaType::Audio)?;
    let id = file.id.clone();
    draft.add_track(file);
    if let Some(stem) = path.file_stem() {
        draft.set_track_title(&id, stem.to_string_lossy());
    }
    Ok(())
}

pub fn apply_video(draft: &mut VideoDraft, args: &VideoArgs) -> anyhow::Result<()> {
    for id in &args.remove_thumbnail {
        draft.remove_thumbnail(&MediaFileId::from(id.as_str()));
    }
    if let Some(path) = &args.video {
        draft.set_video(fs::select_file(path, MediaType::Video)?);
    }
    for path in &args.thumbnail {
        draft.add_thumbnail(fs::select_file(path, MediaType::Image)?);
    }
    if let Some(id) = &args.select_thumbnail {
        draft.select_thumbnail(&MediaFileId::from(id.as_str()));
    }
    if let Some(title) = &args.title {
        draft.set_title(title.as_str());
    }
    if !args.link.is_empty() {
        let links = draft
            .track_links()
            .iter()
            .filter(|link| !link.trim().is_empty())
            .chain(args.link.iter())
            .cloned()
            .collect();
        draft.set_track_links(links);
    }
    apply_video_metadata(draft.metadata_mut(), args);
    Ok(())
}

/// Decodes every file of the entry into `out`. Returns the written paths.
pub fn export_entry(entry: &CatalogEntry, out: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("Failed to create {}", out.to_string_lossy()))?;

    let mut taken = HashSet::new();
    let mut written = Vec::new();
    for file in entry.files() {
        let bytes = file
            .payload
            .decode()
            .with_context(|| format!("Stored file {} is unreadable", file.display_name))?;

        let name = if taken.insert(file.display_name.clone()) {
            file.display_name.clone()
        } else {
            format!("{}-{}", file.id, file.display_name)
        };
        let path = out.join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.to_string_lossy()))?;
        written.push(path);
    }
    Ok(written)
}

fn print_snapshot(snapshot: &ReviewSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}

fn print_entry(entry: &CatalogEntry) {
    let info = entry.info();
    println!("{} [{}] \"{}\"", info.id, entry.kind(), entry.title());
    println!(
        "  Released {}, updated {}",
        info.release_date.format("%Y-%m-%d %H:%M"),
        info.updated_at.format("%Y-%m-%d %H:%M")
    );
    println!(
        "  Plays: {}, unlocks: {}, gifts: {}",
        info.engagement.plays, info.engagement.unlocks, info.engagement.gifts
    );
    match entry {
        CatalogEntry::Single(single) if !single.credits.is_empty() => {
            println!("  feat. {}", single.credits.join(", "));
        }
        CatalogEntry::Album(album) => {
            for (index, track) in album.tracks.iter().enumerate() {
                println!("  {}. {}", index + 1, track.title);
            }
        }
        CatalogEntry::Video(video) => {
            for link in &video.track_links {
                println!("  Track: {link}");
            }
        }
        _ => {}
    }
    println!("  Files:");
    for file in entry.files() {
        println!(
            "    - {} ({}, {}) [{}]",
            file.display_name, file.human_size, file.payload.mime, file.id
        );
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::domain::entry::fixtures::album_entry;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("abc=Intro"), Ok(("abc".into(), "Intro".into())));
        assert_eq!(parse_pair("abc=a=b"), Ok(("abc".into(), "a=b".into())));
        assert!(parse_pair("abc").is_err());
    }

    #[test]
    fn test_parse_artist() -> anyhow::Result<()> {
        assert_eq!(parse_artist("Tems")?, ("Tems".into(), ArtistRole::Primary));
        assert_eq!(parse_artist("Tems:featured")?, ("Tems".into(), ArtistRole::Featured));
        assert!(parse_artist("Tems:drummer").is_err());
        Ok(())
    }

    #[test]
    fn test_cli_parses_publish_edit() {
        let cli = Cli::parse_from(["releasedeck", "publish", "album", "--edit", "42"]);
        let Commands::Publish { kind, edit } = cli.command else {
            panic!("expected publish");
        };
        assert_eq!(kind, MediaKind::Album);
        assert_eq!(edit.as_deref(), Some("42"));
    }

    #[test]
    fn test_edit_target_from_arguments_or_query() -> anyhow::Result<()> {
        assert_eq!(
            edit_target(Some(MediaKind::Video), Some("v1".into()), None)?,
            EditTarget::Video("v1".into())
        );
        assert_eq!(
            edit_target(None, None, Some("albumId=summer%20hits"))?,
            EditTarget::Album("summer hits".into())
        );
        assert!(edit_target(None, None, Some("tab=music")).is_err());
        assert!(edit_target(Some(MediaKind::Album), None, None).is_err());
        Ok(())
    }

    #[test]
    fn test_cli_parses_edit_query() {
        let cli = Cli::parse_from(["releasedeck", "edit", "--query", "mixId=7"]);
        let Commands::Edit { kind, id, query } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!((kind, id), (None, None));
        assert_eq!(query.as_deref(), Some("mixId=7"));
    }

    #[test]
    fn test_apply_single() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let track = write(&tmp, "fall.mp3", b"audio");
        let mut draft = SingleDraft::default();

        apply_single(
            &mut draft,
            &SingleArgs {
                track: Some(track),
                title: Some("Fall".into()),
                credit: vec!["Wizkid".into()],
                music: MusicArgs {
                    genre: Some("Afrobeats".into()),
                    ..Default::default()
                },
                ..Default::default()
            },
        )?;

        assert_eq!(draft.track().map(|t| t.display_name.as_str()), Some("fall.mp3"));
        assert_eq!(draft.title(), "Fall");
        assert_eq!(draft.credits(), ["Wizkid"]);
        assert_eq!(draft.metadata().genre.selected(), Some("Afrobeats"));
        Ok(())
    }

    #[test]
    fn test_apply_single_rejects_wrong_media_type() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let image = write(&tmp, "cover.png", b"png");
        let mut draft = SingleDraft::default();

        let result = apply_single(
            &mut draft,
            &SingleArgs {
                track: Some(image),
                ..Default::default()
            },
        );

        assert!(result.is_err());
        assert!(draft.track().is_none());
        Ok(())
    }

    #[test]
    fn test_apply_album_imports_directory() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        write(&tmp, "02 - Essence.mp3", b"two");
        write(&tmp, "01 - Reckless.mp3", b"one");
        write(&tmp, "cover.jpg", b"jpg");
        let mut draft = AlbumDraft::default();

        apply_album(
            &mut draft,
            &AlbumArgs {
                dir: Some(tmp.path().to_path_buf()),
                title: Some("Made in Lagos".into()),
                artist: vec![("Wizkid".into(), ArtistRole::Primary)],
                ..Default::default()
            },
        )?;

        let titles: Vec<_> = draft
            .tracks()
            .iter()
            .map(|t| draft.track_title(&t.id).to_string())
            .collect();
        assert_eq!(titles, vec!["01 - Reckless", "02 - Essence"]);
        assert_eq!(draft.primary_artists().len(), 1);
        assert_eq!(draft.title(), "Made in Lagos");
        Ok(())
    }

    #[test]
    fn test_apply_album_moves_and_titles_tracks() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let one = write(&tmp, "one.mp3", b"1");
        let two = write(&tmp, "two.mp3", b"2");
        let mut draft = AlbumDraft::default();
        apply_album(
            &mut draft,
            &AlbumArgs {
                track: vec![one, two],
                ..Default::default()
            },
        )?;
        let second = draft.tracks()[1].id.to_string();

        apply_album(
            &mut draft,
            &AlbumArgs {
                track_title: vec![(second.clone(), "Second".into())],
                move_track: vec![(second.clone(), "0".into())],
                ..Default::default()
            },
        )?;

        assert_eq!(draft.tracks()[0].id.as_str(), second);
        assert_eq!(draft.track_title(&draft.tracks()[0].id), "Second");
        Ok(())
    }

    #[test]
    fn test_apply_video_appends_links() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let clip = write(&tmp, "clip.mp4", b"mp4");
        let thumb = write(&tmp, "thumb.png", b"png");
        let mut draft = VideoDraft::default();

        apply_video(
            &mut draft,
            &VideoArgs {
                video: Some(clip),
                thumbnail: vec![thumb],
                link: vec!["https://example.com/t/1".into()],
                ..Default::default()
            },
        )?;
        apply_video(
            &mut draft,
            &VideoArgs {
                link: vec!["https://example.com/t/2".into()],
                ..Default::default()
            },
        )?;

        assert!(draft.video().is_some());
        assert_eq!(draft.thumbnails().len(), 1);
        assert_eq!(
            draft.track_links(),
            ["https://example.com/t/1", "https://example.com/t/2"]
        );
        Ok(())
    }

    #[test]
    fn test_export_entry_restores_files() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let out = tmp.path().join("export");
        let entry = album_entry("a1", "Album", &[("a.mp3", "A"), ("b.mp3", "B")]);

        let written = export_entry(&entry, &out)?;

        assert_eq!(written.len(), 3);
        assert_eq!(std::fs::read(out.join("a.mp3"))?, b"a.mp3");
        assert_eq!(std::fs::read(out.join("cover.png"))?, b"png bytes");
        Ok(())
    }

    #[test]
    fn test_export_keeps_duplicate_names_apart() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let entry = album_entry("a1", "Album", &[("same.mp3", "A"), ("same.mp3", "B")]);

        let written = export_entry(&entry, tmp.path())?;

        assert_eq!(written.len(), 3);
        let unique: HashSet<_> = written.iter().collect();
        assert_eq!(unique.len(), 3);
        Ok(())
    }
}
