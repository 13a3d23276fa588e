//! Input dispatch for front ends.
//!
//! A front end turns window events into [`InputEvent`]s and hands them to a
//! [`Controller`]. The controller looks the event up in its [`KeyBindings`]
//! table, runs the matching editor operation and publishes the new display
//! buffer to an [`ImageSink`].

use crate::config::DEFAULT_AUTOSAVE_INTERVAL;
use crate::editor::AnnotationEditor;
use crate::error::EditorError;
use crate::model::ClickLabel;
use crate::predictor::MaskPredictor;
use crate::render::Frame;
use crate::store::DatasetStore;
use crate::view::ViewTransform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Left clicks mark the object, right clicks the background.
    pub fn click_label(self) -> Option<ClickLabel> {
        match self {
            MouseButton::Left => Some(ClickLabel::Foreground),
            MouseButton::Right => Some(ClickLabel::Background),
            MouseButton::Middle => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A letter, digit or symbol key; letters are stored upper case
    Char(char),
    Escape,
}

/// A key with its Ctrl modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyPress {
    pub fn new(key: Key, ctrl: bool) -> Self {
        let key = match key {
            Key::Char(c) => Key::Char(c.to_ascii_uppercase()),
            other => other,
        };
        Self { key, ctrl }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c), false)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), true)
    }

    pub fn escape() -> Self {
        Self::new(Key::Escape, false)
    }
}

impl std::fmt::Display for KeyPress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{}", c),
            Key::Escape => write!(f, "Esc"),
        }
    }
}

/// Raw input from a front end. Positions are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Click { x: f32, y: f32, button: MouseButton },
    /// Wheel movement in notches, positive away from the user
    Scroll { x: f32, y: f32, notches: f32 },
    Key(KeyPress),
}

/// Everything a front end can ask the editor to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Add a click at an image position
    Click { point: [i32; 2], label: ClickLabel },
    /// Zoom the view around a screen position
    Zoom { x: f32, y: f32, notches: f32 },
    NextImage,
    PrevImage,
    NextCategory,
    PrevCategory,
    SelectCategory(String),
    IncreaseTransparency,
    DecreaseTransparency,
    IncreaseTextSize,
    DecreaseTextSize,
    ToggleContourMode,
    ToggleLabels,
    ToggleAnnotations,
    /// Save the current mask and start a new object
    AddObject,
    Reset,
    /// Delete the last annotation and start a new object
    Delete,
    Persist,
    Quit,
}

/// Key to command table.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    bindings: Vec<(KeyPress, Command)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyPress::escape(), Command::Quit),
                (KeyPress::char('A'), Command::PrevImage),
                (KeyPress::char('D'), Command::NextImage),
                (KeyPress::char('K'), Command::DecreaseTransparency),
                (KeyPress::char('L'), Command::IncreaseTransparency),
                (KeyPress::char('B'), Command::ToggleContourMode),
                (KeyPress::char('T'), Command::ToggleLabels),
                (KeyPress::char('N'), Command::AddObject),
                (KeyPress::char('R'), Command::Reset),
                (KeyPress::ctrl('S'), Command::Persist),
                (KeyPress::ctrl('Z'), Command::Delete),
            ],
        }
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Bind `key` to `command`, returning the command it was bound to before.
    pub fn bind(&mut self, key: KeyPress, command: Command) -> Option<Command> {
        let key = KeyPress::new(key.key, key.ctrl);
        match self.bindings.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, command)),
            None => {
                self.bindings.push((key, command));
                None
            }
        }
    }

    pub fn unbind(&mut self, key: KeyPress) -> Option<Command> {
        let index = self.bindings.iter().position(|(k, _)| *k == key)?;
        Some(self.bindings.remove(index).1)
    }

    pub fn command_for_key(&self, key: KeyPress) -> Option<&Command> {
        self.bindings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, command)| command)
    }

    /// First key bound to `command`, for help texts.
    pub fn key_for_command(&self, command: &Command) -> Option<KeyPress> {
        self.bindings
            .iter()
            .find(|(_, c)| c == command)
            .map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(KeyPress, Command)> {
        self.bindings.iter()
    }
}

/// Whether the front end should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Receives the display buffer after every command.
pub trait ImageSink {
    /// Show `frame`; `title` is the progress label of the current image.
    fn publish(&mut self, frame: &Frame, title: &str);

    /// The view moved or zoomed. The frame itself is unchanged.
    fn set_view(&mut self, _view: &ViewTransform) {}
}

/// Routes input to an editor and publishes the results.
pub struct Controller<P, S, K> {
    editor: AnnotationEditor<P, S>,
    sink: K,
    bindings: KeyBindings,
    view: ViewTransform,
    autosave_interval: usize,
}

impl<P: MaskPredictor, S: DatasetStore, K: ImageSink> Controller<P, S, K> {
    /// Wrap `editor` and publish its current display.
    pub fn new(editor: AnnotationEditor<P, S>, sink: K) -> Self {
        let mut controller = Self {
            editor,
            sink,
            bindings: KeyBindings::default(),
            view: ViewTransform::identity(),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
        };
        controller.publish();
        controller
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Persist every `interval` images when moving forward; 0 disables it.
    pub fn with_autosave_interval(mut self, interval: usize) -> Self {
        self.autosave_interval = interval;
        self
    }

    pub fn editor(&self) -> &AnnotationEditor<P, S> {
        &self.editor
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn into_editor(self) -> AnnotationEditor<P, S> {
        self.editor
    }

    /// The command an event maps to, if any.
    pub fn command_for(&self, event: &InputEvent) -> Option<Command> {
        match *event {
            InputEvent::Click { x, y, button } => {
                let label = button.click_label()?;
                Some(Command::Click {
                    point: self.view.to_image(x, y),
                    label,
                })
            }
            InputEvent::Scroll { x, y, notches } => Some(Command::Zoom { x, y, notches }),
            InputEvent::Key(key) => self.bindings.command_for_key(key).cloned(),
        }
    }

    /// Handle one input event. Unbound events are ignored.
    pub fn handle(&mut self, event: InputEvent) -> Result<Flow, EditorError> {
        match self.command_for(&event) {
            Some(command) => self.execute(command),
            None => Ok(Flow::Continue),
        }
    }

    /// Run `command`. On error nothing is published and the editor keeps
    /// its previous state, except for a failed autosave: the next image is
    /// already loaded and shown when the error is returned.
    pub fn execute(&mut self, command: Command) -> Result<Flow, EditorError> {
        log::debug!("Command: {:?}", command);
        match command {
            Command::Click { point, label } => self.editor.add_click(point, label)?,
            Command::Zoom { x, y, notches } => {
                self.view = self.view.scroll(notches, x, y);
                self.sink.set_view(&self.view);
                return Ok(Flow::Continue);
            }
            Command::NextImage => {
                self.editor.navigate_next()?;
                self.publish();
                self.autosave()?;
                return Ok(Flow::Continue);
            }
            Command::PrevImage => self.editor.navigate_prev()?,
            Command::NextCategory => self.editor.select_next_category(),
            Command::PrevCategory => self.editor.select_prev_category(),
            Command::SelectCategory(name) => self.editor.select_category_by_name(&name)?,
            Command::IncreaseTransparency => self.editor.increase_transparency(),
            Command::DecreaseTransparency => self.editor.decrease_transparency(),
            Command::IncreaseTextSize => self.editor.increase_text_size(),
            Command::DecreaseTextSize => self.editor.decrease_text_size(),
            Command::ToggleContourMode => self.editor.toggle_contour_mode(),
            Command::ToggleLabels => self.editor.toggle_labels(),
            Command::ToggleAnnotations => self.editor.toggle_annotation_visibility(),
            Command::AddObject => {
                self.editor.save_annotation()?;
                self.editor.reset();
            }
            Command::Reset => self.editor.reset(),
            Command::Delete => {
                self.editor.delete_annotations()?;
                self.editor.reset();
            }
            Command::Persist => self.editor.persist()?,
            Command::Quit => return Ok(Flow::Quit),
        }
        self.publish();
        Ok(Flow::Continue)
    }

    fn autosave(&mut self) -> Result<(), EditorError> {
        let index = self.editor.state().image_index;
        if self.autosave_interval > 0 && (index + 1) % self.autosave_interval == 0 {
            log::info!("Autosaving at image {}", self.editor.progress_label());
            self.editor.persist()?;
        }
        Ok(())
    }

    fn publish(&mut self) {
        let title = self.editor.progress_label();
        self.sink.publish(self.editor.display(), &title);
    }
}
