//! Gallery view state: which event is selected, the event creation form, and
//! the photo snapshot for the selected event.

use super::{ClientResult, GalleryApi};
use crate::models::{Event, EventId, NewEvent, PhotoWithUrl};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventForm {
    pub name: String,
    /// Left empty to let the server use today's date.
    pub date: String,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct GalleryView {
    events: Vec<Event>,
    selected_event_id: Option<EventId>,
    form: EventForm,
    show_event_form: bool,
    /// Photos plus the event they were fetched for.
    photos: Option<(EventId, Vec<PhotoWithUrl>)>,
}

impl GalleryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Replace the event list with a fresh snapshot.
    pub fn apply_events(&mut self, events: Vec<Event>) {
        self.events = events;
        self.discard_stale_photos();
    }

    /// The explicitly selected event, else the first one listed.
    ///
    /// An explicit selection that is not (yet) in the snapshot selects nothing.
    pub fn selected_event(&self) -> Option<&Event> {
        match self.selected_event_id {
            Some(id) => self.events.iter().find(|event| event.id == id),
            None => self.events.first(),
        }
    }

    /// With no events and the form closed, only event creation is offered.
    pub fn shows_creation_prompt(&self) -> bool {
        self.events.is_empty() && !self.show_event_form
    }

    pub fn select_event(&mut self, id: EventId) {
        self.selected_event_id = Some(id);
        self.discard_stale_photos();
    }

    /// The event whose photos should be fetched or subscribed to, if any.
    pub fn photo_query(&self) -> Option<EventId> {
        self.selected_event().map(|event| event.id)
    }

    /// Apply a photo snapshot. Snapshots for anything but the current
    /// selection come from an abandoned subscription and are dropped.
    pub fn apply_photos(&mut self, event_id: EventId, photos: Vec<PhotoWithUrl>) {
        if self.photo_query() == Some(event_id) {
            self.photos = Some((event_id, photos));
        } else {
            debug!("dropping photo snapshot for unselected event {}", event_id);
        }
    }

    pub fn photos(&self) -> &[PhotoWithUrl] {
        match &self.photos {
            Some((_, photos)) => photos,
            None => &[],
        }
    }

    fn discard_stale_photos(&mut self) {
        let current = self.photo_query();
        let stale = matches!(&self.photos, Some((id, _)) if Some(*id) != current);
        if stale {
            self.photos = None;
        }
    }

    pub fn is_event_form_open(&self) -> bool {
        self.show_event_form
    }

    pub fn open_event_form(&mut self) {
        self.show_event_form = true;
    }

    pub fn cancel_event_form(&mut self) {
        self.show_event_form = false;
    }

    pub fn form(&self) -> &EventForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EventForm {
        &mut self.form
    }

    /// Create the event described by the form.
    ///
    /// A blank name does nothing. On success the form is cleared and closed
    /// and the new event becomes the selection.
    pub async fn submit_event_form<A: GalleryApi>(
        &mut self,
        api: &A,
    ) -> ClientResult<Option<EventId>> {
        if self.form.name.trim().is_empty() {
            return Ok(None);
        }

        let id = api
            .create_event(NewEvent {
                name: self.form.name.clone(),
                date: Some(self.form.date.clone()),
                description: self.form.description.clone(),
            })
            .await?;

        self.form = EventForm::default();
        self.show_event_form = false;
        self.select_event(id);
        Ok(Some(id))
    }

    /// Re-read events and, if an event is selected, its photos.
    pub async fn refresh<A: GalleryApi>(&mut self, api: &A) -> ClientResult<()> {
        self.apply_events(api.list_events().await?);
        if let Some(event_id) = self.photo_query() {
            let photos = api.list_event_photos(event_id).await?;
            self.apply_photos(event_id, photos);
        }
        Ok(())
    }
}
