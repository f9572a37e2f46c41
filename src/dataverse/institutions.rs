//! Institution name normalization.
//!
//! Maps free-text institution names and common abbreviations to the short
//! dataverse identifiers used as `subtree` filters on Borealis. Keys are
//! lowercase and trimmed; lookups normalize the input the same way.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Alias → canonical dataverse identifier
const INSTITUTION_ALIASES: &[(&str, &str)] = &[
    ("algoma university", "algoma"),
    ("algoma", "algoma"),
    ("sunnybrook research institute", "sunnybrook"),
    ("sunnybrook", "sunnybrook"),
    ("university of victoria", "uvic"),
    ("uvic", "uvic"),
    ("victoria", "uvic"),
    ("acadia university", "acadia"),
    ("acadia", "acadia"),
    ("athabasca university", "athabascau"),
    ("athabasca", "athabascau"),
    ("bishops university", "bishops"),
    ("bishops", "bishops"),
    ("bishop's university", "bishops"),
    ("brandon university", "brandon"),
    ("brandon", "brandon"),
    ("brock university", "brock"),
    ("brock", "brock"),
    ("cape breton university", "capebreton"),
    ("cape breton", "capebreton"),
    ("carleton university", "carleton"),
    ("carleton", "carleton"),
    ("concordia", "concordia"),
    ("concordia university", "concordia"),
    ("dalhousie", "dal"),
    ("dalhousie university", "dal"),
    ("dal", "dal"),
    ("durham", "durham"),
    ("durham college", "durham"),
    ("enap", "enap"),
    ("école nationale d'administration publique", "enap"),
    ("ecole nationale d'administration publique", "enap"),
    ("ets", "ets"),
    ("école de technologie supérieure", "ets"),
    ("ecole de technologie superieure", "ets"),
    ("cegep federation", "federationcegeps"),
    ("federation cegeps", "federationcegeps"),
    ("fanshawe", "fanshawe"),
    ("fanshawe college", "fanshawe"),
    ("georgian college", "georgian"),
    ("georgian", "georgian"),
    ("hec montreal", "hec"),
    ("hec montréal", "hec"),
    ("hec", "hec"),
    ("inrs", "inrs"),
    ("institut national de la recherche scientifique", "inrs"),
    ("lakehead", "lakehead"),
    ("lakehead university", "lakehead"),
    ("laurentian", "laurentian"),
    ("laurentian university", "laurentian"),
    ("macewan", "macewan"),
    ("macewan university", "macewan"),
    ("mcgill", "mcgill"),
    ("mcgill university", "mcgill"),
    ("mcmaster", "mcmaster"),
    ("mcmaster university", "mcmaster"),
    ("memorial", "memorial"),
    ("memorial university", "memorial"),
    ("mount allison", "mta"),
    ("mount allison university", "mta"),
    ("mta", "mta"),
    ("mount royal", "mru"),
    ("mount royal university", "mru"),
    ("mru", "mru"),
    ("mount saint vincent", "msvu"),
    ("mount saint vincent university", "msvu"),
    ("msvu", "msvu"),
    ("nipissing", "nipissing"),
    ("nipissing university", "nipissing"),
    ("ocad", "ocad"),
    ("ocad university", "ocad"),
    ("ontario college of art and design", "ocad"),
    ("ontario tech", "ontariotechu"),
    ("ontario tech university", "ontariotechu"),
    ("ontariotechu", "ontariotechu"),
    ("polytechnique montreal", "polymtl"),
    ("polytechnique montréal", "polymtl"),
    ("polytechnique", "polymtl"),
    ("polymtl", "polymtl"),
    ("queens", "queens"),
    ("queens university", "queens"),
    ("queen's", "queens"),
    ("queen's university", "queens"),
    ("royal military college", "rmc"),
    ("rmc", "rmc"),
    ("royal roads", "rru"),
    ("royal roads university", "rru"),
    ("rru", "rru"),
    ("saint mary's", "smu"),
    ("saint mary's university", "smu"),
    ("st mary's", "smu"),
    ("smu", "smu"),
    ("saint francis xavier", "stfx"),
    ("saint francis xavier university", "stfx"),
    ("st francis xavier", "stfx"),
    ("stfx", "stfx"),
    ("thompson rivers", "tru"),
    ("thompson rivers university", "tru"),
    ("tru", "tru"),
    ("toronto metropolitan university", "tmu"),
    ("toronto metropolitan", "tmu"),
    ("tmu", "tmu"),
    ("ryerson", "tmu"),
    ("ryerson university", "tmu"),
    ("trent", "trent"),
    ("trent university", "trent"),
    ("trinity western", "twu"),
    ("trinity western university", "twu"),
    ("twu", "twu"),
    ("universite de montreal", "montreal"),
    ("université de montréal", "montreal"),
    ("university of montreal", "montreal"),
    ("montreal", "montreal"),
    ("udem", "montreal"),
    ("université de saint-boniface", "USB"),
    ("universite de saint-boniface", "USB"),
    ("usb", "USB"),
    ("université de sherbrooke", "udes"),
    ("universite de sherbrooke", "udes"),
    ("university of sherbrooke", "udes"),
    ("sherbrooke", "udes"),
    ("udes", "udes"),
    ("uqac", "uqac"),
    ("université du québec à chicoutimi", "uqac"),
    ("universite du quebec a chicoutimi", "uqac"),
    ("uqam", "uqam"),
    ("université du québec à montréal", "uqam"),
    ("universite du quebec a montreal", "uqam"),
    ("université du québec en abitibi-témiscamingue", "uqat"),
    ("universite du quebec en abitibi-temiscamingue", "uqat"),
    ("uqat", "uqat"),
    ("université du québec à rimouski", "uqar"),
    ("universite du quebec a rimouski", "uqar"),
    ("uqar", "uqar"),
    ("université du québec à trois-rivières", "uqtr"),
    ("universite du quebec a trois-rivieres", "uqtr"),
    ("uqtr", "uqtr"),
    ("université du québec en outaouais", "uqo"),
    ("universite du quebec en outaouais", "uqo"),
    ("uqo", "uqo"),
    ("université laval", "laval"),
    ("universite laval", "laval"),
    ("laval", "laval"),
    ("université téluq", "teluq"),
    ("universite teluq", "teluq"),
    ("teluq", "teluq"),
    ("téluq", "teluq"),
    ("university of alberta", "ualberta"),
    ("ualberta", "ualberta"),
    ("alberta", "ualberta"),
    ("u of a", "ualberta"),
    ("university of british columbia", "ubc"),
    ("ubc", "ubc"),
    ("british columbia", "ubc"),
    ("university of calgary", "calgary"),
    ("calgary", "calgary"),
    ("u of c", "calgary"),
    ("ucalgary", "calgary"),
    ("university of guelph", "guelph"),
    ("guelph", "guelph"),
    ("university of lethbridge", "lethbridge"),
    ("lethbridge", "lethbridge"),
    ("ulethbridge", "lethbridge"),
    ("university of manitoba", "manitoba"),
    ("manitoba", "manitoba"),
    ("u of m", "manitoba"),
    ("umanitoba", "manitoba"),
    ("university of northern british columbia", "unbc"),
    ("unbc", "unbc"),
    ("northern british columbia", "unbc"),
    ("university of ottawa", "ottawa"),
    ("ottawa", "ottawa"),
    ("uottawa", "ottawa"),
    ("u of o", "ottawa"),
    ("university of regina", "regina"),
    ("regina", "regina"),
    ("uregina", "regina"),
    ("university of toronto", "toronto"),
    ("toronto", "toronto"),
    ("u of t", "toronto"),
    ("uoft", "toronto"),
    ("ut", "toronto"),
    ("university of waterloo", "waterloo"),
    ("waterloo", "waterloo"),
    ("uwaterloo", "waterloo"),
    ("university of windsor", "windsor"),
    ("windsor", "windsor"),
    ("uwindsor", "windsor"),
    ("university of winnipeg", "uwinnipeg"),
    ("winnipeg", "uwinnipeg"),
    ("uwinnipeg", "uwinnipeg"),
    ("vancouver island university", "viu"),
    ("vancouver island", "viu"),
    ("viu", "viu"),
    ("western university", "western"),
    ("western", "western"),
    ("uwo", "western"),
    ("wilfred laurier university", "laurier"),
    ("wilfrid laurier", "laurier"),
    ("wilfrid laurier university", "laurier"),
    ("laurier", "laurier"),
    ("wlu", "laurier"),
    ("york university", "york"),
    ("york", "york"),
];

static ALIAS_INDEX: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn index() -> &'static HashMap<&'static str, &'static str> {
    ALIAS_INDEX.get_or_init(|| INSTITUTION_ALIASES.iter().copied().collect())
}

/// Look up an institution alias, returning `None` when it is not known
pub fn lookup(input: &str) -> Option<&'static str> {
    index().get(input.trim().to_lowercase().as_str()).copied()
}

/// Resolve an institution name to its dataverse identifier.
///
/// Unknown input is returned unchanged so callers can pass identifiers that
/// are not in the table (new collections, sub-dataverses).
///
/// ```
/// use borealis_mcp::dataverse::institutions::resolve;
///
/// assert_eq!(resolve("University of Toronto"), "toronto");
/// assert_eq!(resolve("  UBC "), "ubc");
/// assert_eq!(resolve("my-lab-dataverse"), "my-lab-dataverse");
/// ```
pub fn resolve(input: &str) -> String {
    match lookup(input) {
        Some(id) => id.to_string(),
        None => {
            tracing::debug!("No institution alias for '{}', using it as-is", input);
            input.to_string()
        }
    }
}

/// Canonical identifiers with their aliases, sorted by identifier
pub fn all() -> BTreeMap<&'static str, Vec<&'static str>> {
    let mut grouped: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
    for &(alias, id) in INSTITUTION_ALIASES {
        grouped.entry(id).or_default().push(alias);
    }
    grouped
}
