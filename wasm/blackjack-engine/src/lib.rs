use js_sys::Function;
use wasm_bindgen::prelude::*;

pub mod bankroll;
pub mod card;
pub mod config;
pub mod deck;
pub mod error;
pub mod game;
pub mod hand;
pub mod storage;
pub mod strategy;
pub mod view;

pub use game::{Outcome, Table};
pub use strategy::Action;
pub use view::TableView;

use config::TableConfig;
use error::EngineError;
use storage::LocalStorage;

/// Browser entry point: a table persisted to `localStorage`.
#[wasm_bindgen]
pub struct BlackjackTable {
    table: Table<LocalStorage>,
    on_change: Option<Function>,
}

#[wasm_bindgen]
impl BlackjackTable {
    #[wasm_bindgen(constructor)]
    pub fn new(params: JsValue) -> Result<BlackjackTable, JsValue> {
        console_error_panic_hook::set_once();
        let config: TableConfig = if params.is_undefined() || params.is_null() {
            TableConfig::default()
        } else {
            serde_wasm_bindgen::from_value(params)
                .map_err(|err| JsValue::from_str(&format!("Invalid config: {err}")))?
        };
        let store = LocalStorage::open()
            .map_err(|err| JsValue::from_str(&format!("Storage error: {err}")))?;
        let table = Table::new(config, store)
            .map_err(|err| JsValue::from_str(&format!("Invalid config: {err}")))?;
        Ok(BlackjackTable {
            table,
            on_change: None,
        })
    }

    /// Called with the new view after every action.
    pub fn subscribe(&mut self, callback: Function) {
        self.on_change = Some(callback);
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.table.view())
            .map_err(|err| JsValue::from_str(&format!("Serialization failed: {err}")))
    }

    pub fn deal(&mut self) -> Result<JsValue, JsValue> {
        let result = self.table.start_round();
        self.publish(result)
    }

    pub fn hit(&mut self) -> Result<JsValue, JsValue> {
        let result = self.table.hit();
        self.publish(result)
    }

    pub fn stand(&mut self) -> Result<JsValue, JsValue> {
        let result = self.table.stand();
        self.publish(result)
    }

    pub fn split(&mut self) -> Result<JsValue, JsValue> {
        let result = self.table.split();
        self.publish(result)
    }

    #[wasm_bindgen(js_name = setBet)]
    pub fn set_bet(&mut self, bet: i32) -> Result<JsValue, JsValue> {
        let result = self.table.set_bet(bet as i64);
        self.publish(result)
    }

    #[wasm_bindgen(js_name = resetBankroll)]
    pub fn reset_bankroll(&mut self) -> Result<JsValue, JsValue> {
        self.table.reset_bankroll();
        self.publish(Ok(()))
    }

    #[wasm_bindgen(js_name = resetRecord)]
    pub fn reset_record(&mut self) -> Result<JsValue, JsValue> {
        self.table.reset_record();
        self.publish(Ok(()))
    }

    /// "hit", "stand" or "split".
    pub fn suggest(&self) -> Result<String, JsValue> {
        self.table
            .suggestion()
            .map(|action| action.as_str().to_string())
            .map_err(|err| JsValue::from_str(&format!("Action rejected: {err}")))
    }
}

impl BlackjackTable {
    fn publish(&self, result: Result<(), EngineError>) -> Result<JsValue, JsValue> {
        result.map_err(|err| JsValue::from_str(&format!("Action rejected: {err}")))?;
        let view = self.view()?;
        if let Some(callback) = &self.on_change {
            if let Err(err) = callback.call1(&JsValue::NULL, &view) {
                web_sys::console::warn_2(&JsValue::from_str("view subscriber failed"), &err);
            }
        }
        Ok(view)
    }
}
