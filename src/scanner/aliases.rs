//! Import names whose distribution is published under a different name

use crate::domain::ImportSet;

const DISTRIBUTION_ALIASES: &[(&str, &str)] = &[
    ("Crypto", "pycryptodome"),
    ("MySQLdb", "mysqlclient"),
    ("OpenSSL", "pyOpenSSL"),
    ("PIL", "Pillow"),
    ("attr", "attrs"),
    ("bs4", "beautifulsoup4"),
    ("cv2", "opencv-python"),
    ("dateutil", "python-dateutil"),
    ("docx", "python-docx"),
    ("dotenv", "python-dotenv"),
    ("fitz", "PyMuPDF"),
    ("git", "GitPython"),
    ("jwt", "PyJWT"),
    ("magic", "python-magic"),
    ("serial", "pyserial"),
    ("skimage", "scikit-image"),
    ("sklearn", "scikit-learn"),
    ("usb", "pyusb"),
    ("yaml", "PyYAML"),
];

/// Distribution that provides an importable top-level module
pub fn distribution_name(module: &str) -> &str {
    DISTRIBUTION_ALIASES
        .iter()
        .find(|(import, _)| *import == module)
        .map(|(_, dist)| *dist)
        .unwrap_or(module)
}

/// Map every import to the distribution that provides it
pub fn to_distributions(imports: &ImportSet) -> ImportSet {
    imports.iter().map(distribution_name).collect()
}
