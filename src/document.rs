// In-memory writeup being assembled by the menu.
//
// `entries` is the outline the user sees and edits. The Markdown itself is
// laid out by type: title, machine image, steps in creation order, then the
// flags section. Every mutation re-renders the whole document so the cached
// Markdown always matches the model.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{WriteupError, WriteupResult};

/// Image name reserved for the box's cover picture.
pub const MACHINE_IMAGE: &str = "machine_image";

/// File name used when the writeup has no title.
pub const DEFAULT_FILE_NAME: &str = "untitled_writeup.md";

pub const FOOTER: &str = "\n## Siguenos\n\n\
<div align='center'>\n\
\x20 <p>Thanks for reading! Follow me on my socials:</p>\n\
\x20 <a href='https://x.com/@imahian'><img src='https://www.vectorlogo.zone/logos/x/x-icon.svg' alt='X' width='40'></a>\n\
\x20 <a href='https://discord.gg/dbesG8EX'><img src='https://www.vectorlogo.zone/logos/discord/discord-icon.svg' alt='Discord' width='40'></a>\n\
\x20 <a href='https://youtube.com/@imahian'><img src='https://www.vectorlogo.zone/logos/youtube/youtube-icon.svg' alt='YouTube' width='40'></a>\n\
\x20 <a href='https://twitch.tv/imahian'><img src='https://www.vectorlogo.zone/logos/twitch/twitch-icon.svg' alt='Twitch' width='40'></a>\n\
</div>\n\n\
---\n";

/// One line of the editable outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Title(String),
    Image { name: String, path: PathBuf },
    /// Index into the step table.
    Description(usize),
    /// Index into the flag table.
    Flag(usize),
}

/// One titled section of the writeup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub subtitle: String,
    pub lines: Vec<String>,
    pub oneliner: Option<String>,
    /// Name of the image shown under the step, if any.
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub path: PathBuf,
}

impl Image {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Image {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Writeup {
    title: String,
    images: Vec<Image>,
    steps: Vec<Step>,
    flags: Vec<String>,
    entries: Vec<Entry>,
    markdown: String,
}

/// Mask the back half of a flag: the first `floor(len / 2)` characters stay
/// readable and the rest become `*`.
pub fn redact_flag(flag: &str) -> String {
    let len = flag.chars().count();
    let visible = len / 2;
    let mut out: String = flag.chars().take(visible).collect();
    out.push_str(&"*".repeat(len - visible));
    out
}

/// Short form used in the outline listing.
pub fn flag_preview(flag: &str) -> String {
    let head: String = flag.chars().take(4).collect();
    format!("{head}****")
}

fn ensure_file(path: &Path) -> WriteupResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(WriteupError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

impl Writeup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Markdown as of the last mutation.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a zero-based position in the outline.
    pub fn entry(&self, index: usize) -> WriteupResult<&Entry> {
        self.entries
            .get(index)
            .ok_or(WriteupError::EntryOutOfRange {
                index: index + 1,
                len: self.entries.len(),
            })
    }

    pub fn step(&self, index: usize) -> WriteupResult<&Step> {
        self.steps.get(index).ok_or(WriteupError::EntryOutOfRange {
            index: index + 1,
            len: self.steps.len(),
        })
    }

    pub fn flag(&self, index: usize) -> WriteupResult<&str> {
        self.flags
            .get(index)
            .map(String::as_str)
            .ok_or(WriteupError::EntryOutOfRange {
                index: index + 1,
                len: self.flags.len(),
            })
    }

    pub fn image_path(&self, name: &str) -> Option<&Path> {
        self.images
            .iter()
            .find(|img| img.name == name)
            .map(|img| img.path.as_path())
    }

    /// Validate a step image name. `MACHINE_IMAGE` is reserved and names must
    /// be unique; `replacing` is the name about to be freed by the same step.
    pub fn check_image_name(&self, name: &str, replacing: Option<&str>) -> WriteupResult<()> {
        if name == MACHINE_IMAGE {
            return Err(WriteupError::ReservedImageName {
                name: name.to_string(),
            });
        }
        if replacing != Some(name) && self.images.iter().any(|img| img.name == name) {
            return Err(WriteupError::ImageNameTaken {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// First `image_<n>` not already used by an image.
    pub fn next_image_name(&self) -> String {
        (0..)
            .map(|n| format!("image_{n}"))
            .find(|name| self.images.iter().all(|img| &img.name != name))
            .unwrap_or_else(|| "image".to_string())
    }

    /// Human label for an outline entry, e.g. `Description: Recon`.
    pub fn describe(&self, entry: &Entry) -> String {
        match entry {
            Entry::Title(text) => format!("Title: {text}"),
            Entry::Image { path, .. } => format!("Machine Image: {}", path.display()),
            Entry::Description(i) => {
                let subtitle = self.steps.get(*i).map(|s| s.subtitle.as_str());
                format!("Description: {}", subtitle.unwrap_or_default())
            }
            Entry::Flag(i) => {
                let flag = self.flags.get(*i).map(String::as_str);
                format!("Flag: {}", flag_preview(flag.unwrap_or_default()))
            }
        }
    }

    pub fn set_title(&mut self, text: &str) -> WriteupResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WriteupError::EmptyTitle);
        }
        self.title = text.to_string();

        let entry = Entry::Title(self.title.clone());
        match self
            .entries
            .iter()
            .position(|e| matches!(e, Entry::Title(_)))
        {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }

        debug!(title = %self.title, "title set");
        self.rerender();
        Ok(())
    }

    /// Replace the machine image. Only one may exist at a time.
    pub fn set_machine_image(&mut self, path: &Path) -> WriteupResult<()> {
        ensure_file(path)?;

        self.images.retain(|img| img.name != MACHINE_IMAGE);
        self.entries
            .retain(|e| !matches!(e, Entry::Image { name, .. } if name == MACHINE_IMAGE));

        self.images.push(Image::new(MACHINE_IMAGE, path));
        self.entries.push(Entry::Image {
            name: MACHINE_IMAGE.to_string(),
            path: path.to_path_buf(),
        });

        debug!(path = %path.display(), "machine image set");
        self.rerender();
        Ok(())
    }

    /// Append a step. `lines` are stored as given; reference linking
    /// happens before they reach the model.
    pub fn add_description(
        &mut self,
        subtitle: &str,
        lines: Vec<String>,
        oneliner: Option<String>,
        image: Option<Image>,
    ) -> WriteupResult<usize> {
        let image_name = match image {
            Some(image) => {
                ensure_file(&image.path)?;
                self.check_image_name(&image.name, None)?;
                let name = image.name.clone();
                self.images.push(image);
                Some(name)
            }
            None => None,
        };

        self.steps.push(Step {
            subtitle: subtitle.trim().to_string(),
            lines,
            oneliner: oneliner.filter(|o| !o.trim().is_empty()),
            image: image_name,
        });
        let index = self.steps.len() - 1;
        self.entries.push(Entry::Description(index));

        debug!(index, subtitle, "description added");
        self.rerender();
        Ok(index)
    }

    /// Append a flag. Confirmation is the caller's job.
    pub fn add_flag(&mut self, flag: &str) -> WriteupResult<usize> {
        let flag = flag.trim();
        if flag.is_empty() {
            return Err(WriteupError::EmptyFlag);
        }
        self.flags.push(flag.to_string());
        let index = self.flags.len() - 1;
        self.entries.push(Entry::Flag(index));

        debug!(index, "flag added");
        self.rerender();
        Ok(index)
    }

    pub fn set_flag(&mut self, index: usize, flag: &str) -> WriteupResult<()> {
        let flag = flag.trim();
        if flag.is_empty() {
            return Err(WriteupError::EmptyFlag);
        }
        let len = self.flags.len();
        let slot = self
            .flags
            .get_mut(index)
            .ok_or(WriteupError::EntryOutOfRange {
                index: index + 1,
                len,
            })?;
        *slot = flag.to_string();
        self.rerender();
        Ok(())
    }

    pub fn set_step_subtitle(&mut self, index: usize, subtitle: &str) -> WriteupResult<()> {
        self.step_mut(index)?.subtitle = subtitle.trim().to_string();
        self.rerender();
        Ok(())
    }

    pub fn set_step_lines(&mut self, index: usize, lines: Vec<String>) -> WriteupResult<()> {
        self.step_mut(index)?.lines = lines;
        self.rerender();
        Ok(())
    }

    pub fn set_step_oneliner(&mut self, index: usize, oneliner: Option<String>) -> WriteupResult<()> {
        self.step_mut(index)?.oneliner = oneliner.filter(|o| !o.trim().is_empty());
        self.rerender();
        Ok(())
    }

    /// Swap or clear a step's image. The previous image record is dropped.
    pub fn set_step_image(&mut self, index: usize, image: Option<Image>) -> WriteupResult<()> {
        let current = self.step(index)?.image.clone();
        if let Some(image) = &image {
            ensure_file(&image.path)?;
            self.check_image_name(&image.name, current.as_deref())?;
        }
        let previous = self.step_mut(index)?.image.take();
        if let Some(previous) = previous {
            self.images.retain(|img| img.name != previous);
        }
        if let Some(image) = image {
            self.step_mut(index)?.image = Some(image.name.clone());
            self.images.push(image);
        }
        self.rerender();
        Ok(())
    }

    fn step_mut(&mut self, index: usize) -> WriteupResult<&mut Step> {
        let len = self.steps.len();
        self.steps
            .get_mut(index)
            .ok_or(WriteupError::EntryOutOfRange {
                index: index + 1,
                len,
            })
    }

    fn rerender(&mut self) {
        self.markdown = self.render();
    }

    /// Markdown for the current state, without the footer.
    pub fn render(&self) -> String {
        let mut md = String::new();

        if !self.title.is_empty() {
            md.push_str(&format!("# {}\n\n", self.title));
        }

        for img in self.images.iter().filter(|img| img.name == MACHINE_IMAGE) {
            md.push_str(&format!(
                "<div align='center'>\n  <img src='{}.png' width='400' alt='Machine Image'>\n</div>\n\n",
                img.name
            ));
        }

        for step in &self.steps {
            md.push_str(&format!("## {}\n\n", step.subtitle));
            md.push_str(&step.lines.join("\n"));
            md.push_str("\n\n");
            if let Some(oneliner) = &step.oneliner {
                md.push_str(&format!("```bash\n{oneliner}\n```\n\n"));
            }
            if let Some(image) = &step.image {
                md.push_str(&format!(
                    "<div align='center'>\n  <img src='{image}.png' width='600' alt='{}'>\n</div>\n\n",
                    step.subtitle
                ));
            }
        }

        if !self.flags.is_empty() {
            md.push_str("\n## Flags\n\n");
            for flag in &self.flags {
                md.push_str(&format!("```bash\n{}\n```\n", redact_flag(flag)));
            }
        }

        md
    }

    /// Output file name derived from the title.
    pub fn file_name(&self) -> String {
        if self.title.is_empty() {
            DEFAULT_FILE_NAME.to_string()
        } else {
            format!("{}.md", self.title.replace(' ', "_").to_lowercase())
        }
    }

    /// Render with the footer and write it into `writeups_dir`, creating the
    /// directory if needed. Returns the written path.
    pub fn finish(&mut self, writeups_dir: &Path) -> WriteupResult<PathBuf> {
        self.rerender();
        let document = format!("{}{}", self.markdown, FOOTER);

        if !writeups_dir.exists() {
            fs::create_dir_all(writeups_dir)?;
            info!(dir = %writeups_dir.display(), "created writeups folder");
        }
        let path = writeups_dir.join(self.file_name());
        fs::write(&path, document)?;

        info!(path = %path.display(), "writeup written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn title_renders_as_first_heading() {
        let mut doc = Writeup::new();
        doc.set_title("Box One").unwrap();
        assert_eq!(doc.render().lines().next(), Some("# Box One"));
        assert_eq!(doc.markdown(), doc.render());
    }

    #[test]
    fn blank_title_is_rejected_and_keeps_previous() {
        let mut doc = Writeup::new();
        doc.set_title("Lame").unwrap();
        assert!(matches!(doc.set_title("   "), Err(WriteupError::EmptyTitle)));
        assert_eq!(doc.title(), "Lame");
        assert_eq!(doc.entries().len(), 1);
    }

    #[test]
    fn retitling_updates_the_single_title_entry() {
        let mut doc = Writeup::new();
        doc.set_title("First").unwrap();
        doc.set_title("Second").unwrap();
        assert_eq!(doc.entries(), &[Entry::Title("Second".to_string())]);
    }

    #[test]
    fn redaction_keeps_the_floor_half() {
        for len in 0..20usize {
            let flag: String = "x".repeat(len);
            let out = redact_flag(&flag);
            assert_eq!(out.chars().count(), len);
            assert_eq!(out.chars().filter(|c| *c == 'x').count(), len / 2);
            assert!(out.ends_with(&"*".repeat(len - len / 2)));
        }
        assert_eq!(redact_flag("FLAG{abc123}"), "FLAG{a******");
        assert_eq!(redact_flag("abc"), "a**");
        assert_eq!(redact_flag(""), "");
    }

    #[test]
    fn second_machine_image_replaces_first() {
        let first = NamedTempFile::new().unwrap();
        let second = NamedTempFile::new().unwrap();
        let mut doc = Writeup::new();
        doc.set_machine_image(first.path()).unwrap();
        doc.set_machine_image(second.path()).unwrap();

        let machine: Vec<_> = doc
            .images()
            .iter()
            .filter(|img| img.name == MACHINE_IMAGE)
            .collect();
        assert_eq!(machine.len(), 1);
        assert_eq!(machine[0].path, second.path());
        assert_eq!(doc.entries().len(), 1);
        assert_eq!(doc.render().matches("machine_image.png").count(), 1);
    }

    #[test]
    fn missing_machine_image_is_rejected() {
        let dir = tempdir().unwrap();
        let mut doc = Writeup::new();
        let err = doc.set_machine_image(&dir.path().join("nope.png"));
        assert!(matches!(err, Err(WriteupError::FileNotFound { .. })));
        assert!(doc.images().is_empty());
    }

    #[test]
    fn images_and_flags_render_in_fixed_positions() {
        let cover = NamedTempFile::new().unwrap();
        let mut doc = Writeup::new();
        doc.add_flag("HTB{root}").unwrap();
        doc.add_description("Foothold", vec!["Got a shell.".into()], None, None)
            .unwrap();
        doc.set_machine_image(cover.path()).unwrap();
        doc.set_title("Box").unwrap();

        let md = doc.render();
        let title = md.find("# Box").unwrap();
        let image = md.find("machine_image.png").unwrap();
        let step = md.find("## Foothold").unwrap();
        let flags = md.find("## Flags").unwrap();
        assert!(title < image && image < step && step < flags);

        // outline keeps insertion order
        assert!(matches!(doc.entries()[0], Entry::Flag(0)));
        assert!(matches!(doc.entries()[3], Entry::Title(_)));
    }

    #[test]
    fn step_with_oneliner_and_image() {
        let shot = NamedTempFile::new().unwrap();
        let mut doc = Writeup::new();
        doc.add_description(
            "Scan",
            vec!["line one".into(), "line two".into()],
            Some("nmap -p- 10.0.0.1".into()),
            Some(Image::new("scan_results", shot.path())),
        )
        .unwrap();

        let md = doc.render();
        assert!(md.contains("## Scan\n\nline one\nline two\n\n"));
        assert!(md.contains("```bash\nnmap -p- 10.0.0.1\n```\n\n"));
        assert!(md.contains("<img src='scan_results.png' width='600' alt='Scan'>"));
        assert_eq!(doc.image_path("scan_results"), Some(shot.path()));
    }

    #[test]
    fn replacing_step_image_drops_old_record() {
        let a = NamedTempFile::new().unwrap();
        let b = NamedTempFile::new().unwrap();
        let mut doc = Writeup::new();
        let i = doc
            .add_description("S", vec![], None, Some(Image::new("old", a.path())))
            .unwrap();

        doc.set_step_image(i, Some(Image::new("new", b.path()))).unwrap();
        assert_eq!(doc.images().len(), 1);
        assert_eq!(doc.step(i).unwrap().image.as_deref(), Some("new"));

        doc.set_step_image(i, None).unwrap();
        assert!(doc.images().is_empty());
        assert!(!doc.render().contains("<img"));
    }

    #[test]
    fn step_image_cannot_use_machine_image_name() {
        let cover = NamedTempFile::new().unwrap();
        let shot = NamedTempFile::new().unwrap();
        let mut doc = Writeup::new();
        doc.set_machine_image(cover.path()).unwrap();

        let err = doc.add_description("S", vec![], None, Some(Image::new(MACHINE_IMAGE, shot.path())));
        assert!(matches!(err, Err(WriteupError::ReservedImageName { .. })));
        assert!(doc.steps().is_empty());

        let i = doc.add_description("S", vec![], None, None).unwrap();
        let err = doc.set_step_image(i, Some(Image::new(MACHINE_IMAGE, shot.path())));
        assert!(matches!(err, Err(WriteupError::ReservedImageName { .. })));

        let machine = doc.images().iter().filter(|img| img.name == MACHINE_IMAGE).count();
        assert_eq!(machine, 1);
        assert_eq!(doc.render().matches("machine_image.png").count(), 1);
    }

    #[test]
    fn image_names_stay_unique() {
        let a = NamedTempFile::new().unwrap();
        let b = NamedTempFile::new().unwrap();
        let c = NamedTempFile::new().unwrap();
        let mut doc = Writeup::new();
        let name = doc.next_image_name();
        let first = doc
            .add_description("A", vec![], None, Some(Image::new(name, a.path())))
            .unwrap();
        let name = doc.next_image_name();
        doc.add_description("B", vec![], None, Some(Image::new(name, b.path())))
            .unwrap();
        doc.set_step_image(first, None).unwrap();

        // image_0 was freed, image_1 is still B's
        assert_eq!(doc.next_image_name(), "image_0");
        let err = doc.add_description("C", vec![], None, Some(Image::new("image_1", c.path())));
        assert!(matches!(err, Err(WriteupError::ImageNameTaken { .. })));
        assert_eq!(doc.image_path("image_1"), Some(b.path()));

        // a step may keep its own name when swapping the file
        let second = 1;
        doc.set_step_image(second, Some(Image::new("image_1", c.path())))
            .unwrap();
        assert_eq!(doc.image_path("image_1"), Some(c.path()));
        assert_eq!(doc.images().len(), 1);
    }

    #[test]
    fn empty_flag_is_rejected() {
        let mut doc = Writeup::new();
        assert!(matches!(doc.add_flag("  "), Err(WriteupError::EmptyFlag)));
        assert!(doc.is_empty());
        doc.add_flag("abc").unwrap();
        assert!(matches!(doc.set_flag(0, ""), Err(WriteupError::EmptyFlag)));
        assert_eq!(doc.flag(0).unwrap(), "abc");
    }

    #[test]
    fn out_of_range_entry_is_an_error() {
        let mut doc = Writeup::new();
        doc.set_title("T").unwrap();
        assert!(doc.entry(0).is_ok());
        assert!(matches!(
            doc.entry(5),
            Err(WriteupError::EntryOutOfRange { index: 6, len: 1 })
        ));
    }

    #[test]
    fn render_is_deterministic() {
        let mut doc = Writeup::new();
        doc.set_title("Det").unwrap();
        doc.add_flag("FLAG{x}").unwrap();
        assert_eq!(doc.render(), doc.render());
    }

    #[test]
    fn describe_masks_flags_in_outline() {
        let mut doc = Writeup::new();
        doc.add_flag("FLAG{secret}").unwrap();
        let label = doc.describe(doc.entry(0).unwrap());
        assert_eq!(label, "Flag: FLAG****");
    }

    #[test]
    fn untitled_writeup_uses_default_name() {
        let dir = tempdir().unwrap();
        let mut doc = Writeup::new();
        let path = doc.finish(&dir.path().join("writeups")).unwrap();
        assert_eq!(path.file_name().unwrap(), DEFAULT_FILE_NAME);
        let content = fs::read_to_string(path).unwrap();
        assert!(content.ends_with("---\n"));
    }
}
