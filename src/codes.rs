//! Static code tables and NUTS-style territory classification.
//!
//! Crime codes are ISTAT abbreviations; `CP***` codes refer to articles of
//! the penal code. `STALK` and `CP612BIS` overlap: `STALK` spans 2007-2024
//! with a limited breakdown, `CP612BIS` spans 2022+ with the full one.
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;
use crate::loader;

pub const NATIONAL_CODE: &str = "IT";

/// Bolzano and Trento, reported together as the historical region.
pub const AUTONOMOUS_PROVINCE_CODES: [&str; 2] = ["ITD1", "ITD2"];
pub const MERGED_REGION_CODE: &str = "ITD12";
pub const MERGED_REGION_NAME: &str = "Trentino-Alto Adige";

pub static CRIME_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("TOT", "Totale"),
        // Omicidi
        ("INTENHOM", "Omicidi volontari consumati"),
        ("ATTEMPHOM", "Tentati omicidi"),
        ("MANSHOM", "Omicidi preterintenzionali"),
        ("INFANTHOM", "Infanticidi"),
        ("MAFIAHOM", "Omicidi di tipo mafioso"),
        ("TERRORHOM", "Omicidi per terrorismo"),
        ("MASSMURD", "Stragi"),
        ("ROBBHOM", "Omicidi a scopo di rapina"),
        ("ROADHOM", "Omicidi stradali"),
        ("UNINTHOM", "Omicidi colposi"),
        // Violenza contro la persona
        ("CULPINJU", "Lesioni dolose"),
        ("BLOWS", "Percosse"),
        ("MENACE", "Minacce"),
        ("STALK", "Atti persecutori (stalking)"),
        // Reati sessuali e contro minori
        ("RAPE", "Violenze sessuali"),
        ("RAPEUN18", "Atti sessuali con minorenne"),
        ("CORRUPUN18", "Corruzione di minorenne"),
        ("PORNO", "Pornografia minorile"),
        ("CP572", "Maltrattamenti in famiglia"),
        ("CP612BIS", "Atti persecutori"),
        ("CP612TER", "Diffusione illecita immagini sessuali"),
        ("PROSTI", "Sfruttamento della prostituzione"),
        // Sequestri e rapine
        ("KIDNAPP", "Sequestri di persona"),
        ("ROBBER", "Rapine"),
        ("BANKROB", "Rapine in banca"),
        ("POSTROB", "Rapine in ufficio postale"),
        ("HOUSEROB", "Rapine in abitazione"),
        ("SHOPROB", "Rapine in esercizi commerciali"),
        ("STREETROB", "Rapine in pubblica via"),
        // Estorsione e usura
        ("EXTORT", "Estorsioni"),
        ("USURY", "Usura"),
        // Furti
        ("THEFT", "Furti"),
        ("PICKTHEF", "Borseggi"),
        ("SHOPTHEF", "Furti in esercizi commerciali"),
        ("BAGTHEF", "Furti con destrezza"),
        ("BURGTHEF", "Furti con scasso"),
        ("VEHITHEF", "Furti di autoveicoli"),
        ("CARTHEF", "Furti di autovetture"),
        ("MOPETHEF", "Furti di ciclomotori"),
        ("MOTORTHEF", "Furti di motocicli"),
        ("TRUCKTHEF", "Furti di autocarri"),
        ("ARTTHEF", "Furti di opere d'arte"),
        // Ricettazione e danni
        ("RECEIV", "Ricettazione"),
        ("DAMAGE", "Danneggiamenti"),
        ("DAMARS", "Incendi dolosi"),
        ("ARSON", "Incendi"),
        // Frodi e informatica
        ("SWINCYB", "Truffe e frodi informatiche"),
        ("CYBERCRIM", "Delitti informatici"),
        ("INTPROP", "Violazioni proprieta' intellettuale"),
        ("COUNTER", "Contraffazione"),
        // Criminalita' organizzata e altro
        ("SMUGGL", "Contrabbando"),
        ("DRUG", "Stupefacenti"),
        ("MONEYLAU", "Riciclaggio"),
        ("CRIMASS", "Associazione per delinquere"),
        ("MAFIASS", "Associazione di tipo mafioso"),
        ("FOREARS", "Porto abusivo di armi"),
        ("ATTACK", "Attentati"),
        ("OFFENCE", "Resistenza a pubblico ufficiale"),
    ])
});

pub static MACRO_AREAS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("IT", "Italia"),
        ("ITC", "Nord-ovest"),
        ("ITD", "Nord-est"),
        ("ITE", "Centro"),
        ("ITF", "Sud"),
        ("ITG", "Isole"),
    ])
});

/// NUTS2 regions as they appear in the raw files (ITD1/ITD2 are the two
/// autonomous provinces).
pub static REGIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("ITC1", "Piemonte"),
        ("ITC2", "Valle d'Aosta"),
        ("ITC3", "Liguria"),
        ("ITC4", "Lombardia"),
        ("ITD1", "Provincia Autonoma Bolzano"),
        ("ITD2", "Provincia Autonoma Trento"),
        ("ITD3", "Veneto"),
        ("ITD4", "Friuli-Venezia Giulia"),
        ("ITD5", "Emilia-Romagna"),
        ("ITE1", "Toscana"),
        ("ITE2", "Umbria"),
        ("ITE3", "Marche"),
        ("ITE4", "Lazio"),
        ("ITF1", "Abruzzo"),
        ("ITF2", "Molise"),
        ("ITF3", "Campania"),
        ("ITF4", "Puglia"),
        ("ITF5", "Basilicata"),
        ("ITF6", "Calabria"),
        ("ITG1", "Sicilia"),
        ("ITG2", "Sardegna"),
    ])
});

/// Provinces created in 2009, outside the NUTS3 coding: (code, name, region).
pub const SPECIAL_PROVINCES: [(&str, &str, &str); 3] = [
    ("IT108", "Monza e della Brianza", "Lombardia"),
    ("IT109", "Fermo", "Marche"),
    ("IT110", "Barletta-Andria-Trani", "Puglia"),
];

fn special_province(code: &str) -> Option<(&'static str, &'static str)> {
    SPECIAL_PROVINCES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, name, region)| (*name, *region))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerritoryKind {
    Country,
    MacroArea,
    Region,
    Province,
    SpecialProvince,
}

impl TerritoryKind {
    /// Classify a code by its shape: `IT` is the country, three characters a
    /// macro-area, four a region, anything longer a province.
    pub fn of(code: &str) -> Self {
        if special_province(code).is_some() {
            return TerritoryKind::SpecialProvince;
        }
        match code.chars().count() {
            _ if code == NATIONAL_CODE => TerritoryKind::Country,
            0..=3 => TerritoryKind::MacroArea,
            4 => TerritoryKind::Region,
            _ => TerritoryKind::Province,
        }
    }

    pub fn is_province(self) -> bool {
        matches!(
            self,
            TerritoryKind::Province | TerritoryKind::SpecialProvince
        )
    }
}

pub fn is_province(code: &str) -> bool {
    TerritoryKind::of(code).is_province()
}

/// Label for a crime code; unknown codes pass through unchanged.
pub fn crime_label(code: &str) -> String {
    CRIME_NAMES
        .get(code)
        .map(|s| s.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Region owning a province. Standard NUTS3 codes carry the region in their
/// first four characters; special provinces have it hard-coded.
pub fn region_name(code: &str) -> String {
    if let Some((_, region)) = special_province(code) {
        return region.to_string();
    }
    let region_code = if code.chars().count() >= 5 {
        code.get(..4).unwrap_or(code)
    } else {
        code
    };
    REGIONS
        .get(region_code)
        .map(|s| s.to_string())
        .unwrap_or_else(|| region_code.to_string())
}

/// Display names for territory codes.
#[derive(Debug, Clone)]
pub struct TerritoryNames {
    names: HashMap<String, String>,
}

impl TerritoryNames {
    /// Names known from the static tables alone.
    pub fn builtin() -> Self {
        let mut names: HashMap<String, String> = HashMap::new();
        for (code, name) in MACRO_AREAS.iter().chain(REGIONS.iter()) {
            names.insert(code.to_string(), name.to_string());
        }
        names.insert(MERGED_REGION_CODE.to_string(), MERGED_REGION_NAME.to_string());
        for (code, name, _) in SPECIAL_PROVINCES {
            names.insert(code.to_string(), name.to_string());
        }
        TerritoryNames { names }
    }

    /// Built-in names overridden by the `REF_AREA -> Territorio` pairs of a
    /// processed provincial file, which is authoritative for province names.
    /// A missing file leaves the built-in names.
    pub fn load(processed_provinces: &Path) -> Result<Self> {
        let mut names = Self::builtin();
        if processed_provinces.exists() {
            names
                .names
                .extend(loader::load_territory_names(processed_provinces)?);
        }
        Ok(names)
    }

    pub fn display_name(&self, code: &str) -> String {
        self.names
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    /// Number of codes with a name.
    pub fn mapped_count(&self) -> usize {
        self.names.len()
    }
}
