//! Scripted portal for page-object and workflow tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::driver::{MockDom, MockDriver, MockElement, PortalDriver};
use crate::node::LocatorTimeouts;
use crate::portal::FollowUpPage;

pub(crate) const USERNAME: &str = "#username";
pub(crate) const PASSWORD: &str = "#password";
pub(crate) const SUBMIT: &str = "#kc-login";
pub(crate) const FOLLOW_UP_BUTTON: &str = "div:has(>*>*>.SEGUIMIENTO_EDUCATIVO) button";
pub(crate) const MESSAGES_LINK: &str = "a:has(img[alt='Mensajes'])";
pub(crate) const UNREAD_LABEL: &str = "#numeroMensajes";
pub(crate) const DELETE_BUTTON: &str = "#i_ELIMINAR_MENSAJES_SELECCIONADO";
pub(crate) const ROWS: &str = "table[class='TableData'] tr:has([class^='cuerpo'])";
pub(crate) const MESSAGE_TABLE: &str = ".tablaFondoMenRec";
pub(crate) const DOCUMENTS: &str = "tr:has(>*>img[src*='txt-icon'])";

/// Bind the portal's frame chain: page > barra, page > inferior > principal > {cuerpo, botonera}
pub(crate) fn bind_frames(driver: &MockDriver) {
    driver.add_frame("page", "[name='barraNavegacion']", "barra");
    driver.add_frame("page", "[name='inferior']", "inferior");
    driver.add_frame("inferior", "[name='principal']", "principal");
    driver.add_frame("principal", "[name='cuerpo']", "cuerpo");
    driver.add_frame("principal", "[name='botoneraTitulo']", "botonera");
}

pub(crate) fn row_root(index: usize) -> String {
    format!(
        "table[class='TableData']:has(img[src*='ico_sobre']) tr:nth-of-type({})",
        index + 2
    )
}

pub(crate) fn row_cell(index: usize, column: usize) -> String {
    format!("{} td:nth-of-type({column})", row_root(index))
}

pub(crate) fn document_link(index: usize) -> String {
    format!("{DOCUMENTS} >> nth={index} >> td:has(a) a")
}

/// Content of one scripted message
#[derive(Debug, Clone)]
pub(crate) struct RowSeed {
    pub date: String,
    pub from: String,
    pub subject: String,
    pub is_response: bool,
    pub group: String,
    pub centre: String,
    pub clip: bool,
    pub body: String,
    pub files: Vec<(String, Vec<u8>)>,
}

impl RowSeed {
    pub(crate) fn new(from: &str, subject: &str) -> Self {
        Self {
            date: "19/10/2026 09:15".to_string(),
            from: from.to_string(),
            subject: subject.to_string(),
            is_response: false,
            group: String::new(),
            centre: String::new(),
            clip: false,
            body: "Cuerpo del mensaje".to_string(),
            files: Vec::new(),
        }
    }

    pub(crate) fn response(mut self) -> Self {
        self.is_response = true;
        self
    }

    pub(crate) fn with_group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    pub(crate) fn with_centre(mut self, centre: &str) -> Self {
        self.centre = centre.to_string();
        self
    }

    pub(crate) fn with_attachments(mut self) -> Self {
        self.clip = true;
        self
    }

    pub(crate) fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub(crate) fn with_file(mut self, name: &str, bytes: &[u8]) -> Self {
        self.clip = true;
        self.files.push((name.to_string(), bytes.to_vec()));
        self
    }
}

/// Write a row's cells into the body frame
pub(crate) fn seed_row_in(dom: &mut MockDom, index: usize, seed: &RowSeed) {
    let response = if seed.is_response { "Sí" } else { "No" };
    let cells = [
        (1, String::new()),
        (2, String::new()),
        (3, String::new()),
        (4, format!(" {} ", seed.date)),
        (5, format!("  {}\n", seed.from)),
        (6, format!("\t{} ", seed.subject)),
        (7, response.to_string()),
        (8, seed.group.clone()),
        (9, seed.centre.clone()),
    ];
    for (column, text) in cells {
        dom.insert("cuerpo", row_cell(index, column), MockElement::text(text));
    }
    dom.insert(
        "cuerpo",
        format!("{} input", row_cell(index, 3)),
        MockElement::new(),
    );
    let clip = format!("{} >> img[src*='attach']", row_cell(index, 2));
    if seed.clip {
        dom.insert("cuerpo", clip, MockElement::new());
    } else {
        let _ = dom.remove("cuerpo", &clip);
    }
}

/// Write an opened message's content pane and attachment rows
pub(crate) fn open_message_in(dom: &mut MockDom, seed: &RowSeed) {
    dom.insert(
        "cuerpo",
        MESSAGE_TABLE,
        MockElement::text(format!("\n   {}  \n", seed.body)),
    );
    for index in 0..8 {
        let _ = dom.remove("cuerpo", &document_link(index));
    }
    if seed.files.is_empty() {
        let _ = dom.remove("cuerpo", DOCUMENTS);
        return;
    }
    dom.insert(
        "cuerpo",
        DOCUMENTS,
        MockElement::new().with_count(seed.files.len()),
    );
    for (index, (name, bytes)) in seed.files.iter().enumerate() {
        let link = document_link(index);
        dom.insert("cuerpo", link.clone(), MockElement::new());
        dom.queue_download("cuerpo", &link, name.clone(), bytes.clone());
    }
}

/// A [`MockDriver`] with the portal's frames bound
pub(crate) struct PortalFixture {
    pub driver: Arc<MockDriver>,
}

impl PortalFixture {
    pub(crate) fn new() -> Self {
        let driver = Arc::new(MockDriver::new());
        bind_frames(&driver);
        Self { driver }
    }

    pub(crate) fn dyn_driver(&self) -> Arc<dyn PortalDriver> {
        self.driver.clone()
    }

    pub(crate) fn follow_up_page(&self) -> FollowUpPage {
        FollowUpPage::new(self.dyn_driver(), LocatorTimeouts::default(), None)
    }

    pub(crate) fn seed_row(&self, index: usize, seed: &RowSeed) {
        self.driver.with_dom(|dom| seed_row_in(dom, index, seed));
    }

    pub(crate) fn open_message(&self, files: &[&str]) {
        let seed = files
            .iter()
            .fold(RowSeed::new("Doe, John", "Hola"), |seed, name| {
                seed.with_file(name, name.as_bytes())
            });
        self.driver.with_dom(|dom| open_message_in(dom, &seed));
    }

    /// Login form that accepts any credentials, then the applications panel
    pub(crate) fn accept_login(&self) {
        self.login_form();
        self.driver.on_click("page", SUBMIT, |dom| {
            let _ = dom.remove("page", USERNAME);
        });
        self.driver
            .add_element("page", FOLLOW_UP_BUTTON, MockElement::new());
        self.driver.on_click("page", FOLLOW_UP_BUTTON, |dom| {
            let _ = dom.remove("page", FOLLOW_UP_BUTTON);
        });
    }

    /// Login form whose username field never goes away
    pub(crate) fn reject_login(&self) {
        self.login_form();
    }

    fn login_form(&self) {
        for key in [USERNAME, PASSWORD, SUBMIT] {
            self.driver.add_element("page", key, MockElement::new());
        }
    }

    /// Unread messages served one per "Mensajes" click, always at row 0.
    ///
    /// Opening a message (subject click) renders its content pane; the
    /// delete button asks for confirmation.
    pub(crate) fn script_inbox(&self, messages: Vec<RowSeed>) {
        self.driver.add_element(
            "barra",
            UNREAD_LABEL,
            MockElement::text(messages.len().to_string()),
        );
        self.driver
            .add_element("barra", MESSAGES_LINK, MockElement::new());
        self.driver.add_element(
            "botonera",
            DELETE_BUTTON,
            MockElement::new().confirming(),
        );

        let queue = Arc::new(Mutex::new(VecDeque::from(messages)));
        let current: Arc<Mutex<Option<RowSeed>>> = Arc::new(Mutex::new(None));

        let shown = Arc::clone(&current);
        self.driver.on_click("barra", MESSAGES_LINK, move |dom| {
            let next = queue.lock().unwrap().pop_front();
            let _ = dom.remove("cuerpo", MESSAGE_TABLE);
            if let Some(seed) = &next {
                seed_row_in(dom, 0, seed);
            } else {
                for column in 1..=9 {
                    let _ = dom.remove("cuerpo", &row_cell(0, column));
                }
            }
            *shown.lock().unwrap() = next;
        });

        self.driver
            .on_click("cuerpo", row_cell(0, 6), move |dom| {
                if let Some(seed) = current.lock().unwrap().as_ref() {
                    open_message_in(dom, seed);
                }
            });
    }
}
