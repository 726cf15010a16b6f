use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Element {
    H = 1,
    He,
    Li,
    Be,
    B,
    C,
    N,
    O,
    F,
    Ne,
    Na,
    Mg,
    Al,
    Si,
    P,
    S,
    Cl,
    Ar,
    K,
    Ca,
    Sc,
    Ti,
    V,
    Cr,
    Mn,
    Fe,
    Co,
    Ni,
    Cu,
    Zn,
    Ga,
    Ge,
    As,
    Se,
    Br,
    Kr,
    Rb,
    Sr,
    Y,
    Zr,
    Nb,
    Mo,
    Tc,
    Ru,
    Rh,
    Pd,
    Ag,
    Cd,
    In,
    Sn,
    Sb,
    Te,
    I,
    Xe,
    Cs,
    Ba,
    La,
    Ce,
    Pr,
    Nd,
    Pm,
    Sm,
    Eu,
    Gd,
    Tb,
    Dy,
    Ho,
    Er,
    Tm,
    Yb,
    Lu,
    Hf,
    Ta,
    W,
    Re,
    Os,
    Ir,
    Pt,
    Au,
    Hg,
    Tl,
    Pb,
    Bi,
    Po,
    At,
    Rn,
    Fr,
    Ra,
    Ac,
    Th,
    Pa,
    U,
    Np,
    Pu,
    Am,
    Cm,
    Bk,
    Cf,
    Es,
    Fm,
    Md,
    No,
    Lr,
    Rf,
    Db,
    Sg,
    Bh,
    Hs,
    Mt,
    Ds,
    Rg,
    Cn,
    Nh,
    Fl,
    Mc,
    Lv,
    Ts,
    Og = 118,
}

/// Tabulated per-element data: symbol, standard atomic mass (u) and
/// single-bond covalent radius in Ångströms (Cordero et al., 2008; low-spin
/// values for Mn, Fe and Co). Rows are ordered by atomic number.
struct ElementData {
    element: Element,
    symbol: &'static str,
    mass: f64,
    covalent_radius: Option<f64>,
}

impl ElementData {
    const fn new(
        element: Element,
        symbol: &'static str,
        mass: f64,
        covalent_radius: Option<f64>,
    ) -> Self {
        Self {
            element,
            symbol,
            mass,
            covalent_radius,
        }
    }
}

#[rustfmt::skip]
const ELEMENT_DATA: [ElementData; 118] = [
    ElementData::new(Element::H, "H", 1.008, Some(0.31)),
    ElementData::new(Element::He, "He", 4.0026, Some(0.28)),
    ElementData::new(Element::Li, "Li", 6.94, Some(1.28)),
    ElementData::new(Element::Be, "Be", 9.0122, Some(0.96)),
    ElementData::new(Element::B, "B", 10.81, Some(0.84)),
    ElementData::new(Element::C, "C", 12.011, Some(0.76)),
    ElementData::new(Element::N, "N", 14.007, Some(0.71)),
    ElementData::new(Element::O, "O", 15.999, Some(0.66)),
    ElementData::new(Element::F, "F", 18.998, Some(0.57)),
    ElementData::new(Element::Ne, "Ne", 20.18, Some(0.58)),
    ElementData::new(Element::Na, "Na", 22.99, Some(1.66)),
    ElementData::new(Element::Mg, "Mg", 24.305, Some(1.41)),
    ElementData::new(Element::Al, "Al", 26.982, Some(1.21)),
    ElementData::new(Element::Si, "Si", 28.085, Some(1.11)),
    ElementData::new(Element::P, "P", 30.974, Some(1.07)),
    ElementData::new(Element::S, "S", 32.06, Some(1.05)),
    ElementData::new(Element::Cl, "Cl", 35.45, Some(1.02)),
    ElementData::new(Element::Ar, "Ar", 39.948, Some(1.06)),
    ElementData::new(Element::K, "K", 39.098, Some(2.03)),
    ElementData::new(Element::Ca, "Ca", 40.078, Some(1.76)),
    ElementData::new(Element::Sc, "Sc", 44.956, Some(1.7)),
    ElementData::new(Element::Ti, "Ti", 47.867, Some(1.6)),
    ElementData::new(Element::V, "V", 50.942, Some(1.53)),
    ElementData::new(Element::Cr, "Cr", 51.996, Some(1.39)),
    ElementData::new(Element::Mn, "Mn", 54.938, Some(1.39)),
    ElementData::new(Element::Fe, "Fe", 55.845, Some(1.32)),
    ElementData::new(Element::Co, "Co", 58.933, Some(1.26)),
    ElementData::new(Element::Ni, "Ni", 58.693, Some(1.24)),
    ElementData::new(Element::Cu, "Cu", 63.546, Some(1.32)),
    ElementData::new(Element::Zn, "Zn", 65.38, Some(1.22)),
    ElementData::new(Element::Ga, "Ga", 69.723, Some(1.22)),
    ElementData::new(Element::Ge, "Ge", 72.63, Some(1.2)),
    ElementData::new(Element::As, "As", 74.922, Some(1.19)),
    ElementData::new(Element::Se, "Se", 78.971, Some(1.2)),
    ElementData::new(Element::Br, "Br", 79.904, Some(1.2)),
    ElementData::new(Element::Kr, "Kr", 83.798, Some(1.16)),
    ElementData::new(Element::Rb, "Rb", 85.468, Some(2.2)),
    ElementData::new(Element::Sr, "Sr", 87.62, Some(1.95)),
    ElementData::new(Element::Y, "Y", 88.906, Some(1.9)),
    ElementData::new(Element::Zr, "Zr", 91.224, Some(1.75)),
    ElementData::new(Element::Nb, "Nb", 92.906, Some(1.64)),
    ElementData::new(Element::Mo, "Mo", 95.96, Some(1.54)),
    ElementData::new(Element::Tc, "Tc", 98.0, Some(1.47)),
    ElementData::new(Element::Ru, "Ru", 101.07, Some(1.46)),
    ElementData::new(Element::Rh, "Rh", 102.91, Some(1.42)),
    ElementData::new(Element::Pd, "Pd", 106.42, Some(1.39)),
    ElementData::new(Element::Ag, "Ag", 107.87, Some(1.45)),
    ElementData::new(Element::Cd, "Cd", 112.41, Some(1.44)),
    ElementData::new(Element::In, "In", 114.82, Some(1.42)),
    ElementData::new(Element::Sn, "Sn", 118.71, Some(1.39)),
    ElementData::new(Element::Sb, "Sb", 121.76, Some(1.39)),
    ElementData::new(Element::Te, "Te", 127.6, Some(1.38)),
    ElementData::new(Element::I, "I", 126.9, Some(1.39)),
    ElementData::new(Element::Xe, "Xe", 131.29, Some(1.4)),
    ElementData::new(Element::Cs, "Cs", 132.91, Some(2.44)),
    ElementData::new(Element::Ba, "Ba", 137.33, Some(2.15)),
    ElementData::new(Element::La, "La", 138.91, Some(2.07)),
    ElementData::new(Element::Ce, "Ce", 140.12, Some(2.04)),
    ElementData::new(Element::Pr, "Pr", 140.91, Some(2.03)),
    ElementData::new(Element::Nd, "Nd", 144.24, Some(2.01)),
    ElementData::new(Element::Pm, "Pm", 145.0, Some(1.99)),
    ElementData::new(Element::Sm, "Sm", 150.36, Some(1.98)),
    ElementData::new(Element::Eu, "Eu", 151.96, Some(1.98)),
    ElementData::new(Element::Gd, "Gd", 157.25, Some(1.96)),
    ElementData::new(Element::Tb, "Tb", 158.93, Some(1.94)),
    ElementData::new(Element::Dy, "Dy", 162.5, Some(1.92)),
    ElementData::new(Element::Ho, "Ho", 164.93, Some(1.92)),
    ElementData::new(Element::Er, "Er", 167.26, Some(1.89)),
    ElementData::new(Element::Tm, "Tm", 168.93, Some(1.9)),
    ElementData::new(Element::Yb, "Yb", 173.05, Some(1.87)),
    ElementData::new(Element::Lu, "Lu", 174.97, Some(1.87)),
    ElementData::new(Element::Hf, "Hf", 178.49, Some(1.75)),
    ElementData::new(Element::Ta, "Ta", 180.95, Some(1.7)),
    ElementData::new(Element::W, "W", 183.84, Some(1.62)),
    ElementData::new(Element::Re, "Re", 186.21, Some(1.51)),
    ElementData::new(Element::Os, "Os", 190.23, Some(1.44)),
    ElementData::new(Element::Ir, "Ir", 192.22, Some(1.41)),
    ElementData::new(Element::Pt, "Pt", 195.08, Some(1.36)),
    ElementData::new(Element::Au, "Au", 196.97, Some(1.36)),
    ElementData::new(Element::Hg, "Hg", 200.59, Some(1.32)),
    ElementData::new(Element::Tl, "Tl", 204.38, Some(1.45)),
    ElementData::new(Element::Pb, "Pb", 207.2, Some(1.46)),
    ElementData::new(Element::Bi, "Bi", 208.98, Some(1.48)),
    ElementData::new(Element::Po, "Po", 209.0, Some(1.4)),
    ElementData::new(Element::At, "At", 210.0, Some(1.5)),
    ElementData::new(Element::Rn, "Rn", 222.0, Some(1.5)),
    ElementData::new(Element::Fr, "Fr", 223.0, Some(2.6)),
    ElementData::new(Element::Ra, "Ra", 226.0, Some(2.21)),
    ElementData::new(Element::Ac, "Ac", 227.0, Some(2.15)),
    ElementData::new(Element::Th, "Th", 232.04, Some(2.06)),
    ElementData::new(Element::Pa, "Pa", 231.04, Some(2.0)),
    ElementData::new(Element::U, "U", 238.03, Some(1.96)),
    ElementData::new(Element::Np, "Np", 237.0, Some(1.9)),
    ElementData::new(Element::Pu, "Pu", 244.0, Some(1.87)),
    ElementData::new(Element::Am, "Am", 243.0, Some(1.8)),
    ElementData::new(Element::Cm, "Cm", 247.0, Some(1.69)),
    ElementData::new(Element::Bk, "Bk", 247.0, None),
    ElementData::new(Element::Cf, "Cf", 251.0, None),
    ElementData::new(Element::Es, "Es", 252.0, None),
    ElementData::new(Element::Fm, "Fm", 257.0, None),
    ElementData::new(Element::Md, "Md", 258.0, None),
    ElementData::new(Element::No, "No", 259.0, None),
    ElementData::new(Element::Lr, "Lr", 262.0, None),
    ElementData::new(Element::Rf, "Rf", 267.0, None),
    ElementData::new(Element::Db, "Db", 270.0, None),
    ElementData::new(Element::Sg, "Sg", 271.0, None),
    ElementData::new(Element::Bh, "Bh", 270.0, None),
    ElementData::new(Element::Hs, "Hs", 277.0, None),
    ElementData::new(Element::Mt, "Mt", 276.0, None),
    ElementData::new(Element::Ds, "Ds", 281.0, None),
    ElementData::new(Element::Rg, "Rg", 280.0, None),
    ElementData::new(Element::Cn, "Cn", 285.0, None),
    ElementData::new(Element::Nh, "Nh", 284.0, None),
    ElementData::new(Element::Fl, "Fl", 289.0, None),
    ElementData::new(Element::Mc, "Mc", 288.0, None),
    ElementData::new(Element::Lv, "Lv", 293.0, None),
    ElementData::new(Element::Ts, "Ts", 294.0, None),
    ElementData::new(Element::Og, "Og", 294.0, None),
];

impl Element {
    #[inline]
    fn data(&self) -> &'static ElementData {
        &ELEMENT_DATA[*self as usize - 1]
    }

    pub fn atomic_mass(&self) -> f64 {
        self.data().mass
    }

    #[inline]
    pub fn symbol(&self) -> &'static str {
        self.data().symbol
    }

    /// Single-bond covalent radius in Ångströms, `None` beyond curium.
    pub fn covalent_radius(&self) -> Option<f64> {
        self.data().covalent_radius
    }

    /// Parses a symbol ignoring letter case (`"CL"` and `"cl"` give chlorine).
    pub fn from_symbol_ignore_case(symbol: &str) -> Option<Self> {
        let symbol = symbol.trim();
        ELEMENT_DATA
            .iter()
            .find(|d| d.symbol.eq_ignore_ascii_case(symbol))
            .map(|d| d.element)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ELEMENT_DATA
            .iter()
            .find(|d| d.symbol == s)
            .map(|d| d.element)
            .ok_or_else(|| ParseElementError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn table_rows_follow_atomic_number() {
        for (i, row) in ELEMENT_DATA.iter().enumerate() {
            assert_eq!(row.element as usize, i + 1);
        }
    }

    #[test]
    fn element_from_str_is_case_sensitive() {
        assert_eq!(Element::from_str("Fe").unwrap(), Element::Fe);
        assert_eq!(Element::from_str("Og").unwrap(), Element::Og);
        let err = Element::from_str("h").unwrap_err();
        assert_eq!(err.to_string(), "invalid or unsupported element symbol: 'h'");
    }

    #[test]
    fn lenient_symbol_lookup() {
        assert_eq!(Element::from_symbol_ignore_case("CL"), Some(Element::Cl));
        assert_eq!(Element::from_symbol_ignore_case(" na "), Some(Element::Na));
        assert_eq!(Element::from_symbol_ignore_case("Xx"), None);
    }

    #[test]
    fn elements_display_their_symbol() {
        assert_eq!(Element::Na.to_string(), "Na");
    }

    #[test]
    fn masses_and_radii() {
        assert!(approx_eq(Element::H.atomic_mass(), 1.008, 1e-6));
        assert!(approx_eq(Element::C.atomic_mass(), 12.011, 1e-6));
        assert!(approx_eq(Element::H.covalent_radius().unwrap(), 0.31, 1e-12));
        assert!(approx_eq(Element::O.covalent_radius().unwrap(), 0.66, 1e-12));
        assert_eq!(Element::Og.covalent_radius(), None);
    }
}
