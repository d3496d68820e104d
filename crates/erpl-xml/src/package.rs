// SPDX-License-Identifier: MIT OR Apache-2.0
//! Package-create request body builder (§4.2).

/// Build the `POST /sap/bc/adt/packages` request body XML for creating a
/// development package.
pub fn build_package_create_xml(name: &str, description: &str, super_package: Option<&str>) -> String {
    let super_pkg = super_package.unwrap_or("$TMP");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<pak:package xmlns:pak="http://www.sap.com/adt/packages" xmlns:adtcore="http://www.sap.com/adt/core"
    adtcore:type="DEVC/K" adtcore:name="{name}" adtcore:description="{description}">
  <pak:attributes packageType="development"/>
  <pak:superPackage adtcore:name="{super_pkg}"/>
  <pak:applicationComponent/>
  <pak:transport>
    <pak:softwareComponent/>
    <pak:transportLayer/>
  </pak:transport>
  <pak:useAccesses/>
  <pak:packageInterfaces/>
  <pak:subPackages/>
  <pak:translation/>
</pak:package>"#,
        name = escape(name),
        description = escape(description),
        super_pkg = escape(super_pkg),
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_super_package_is_tmp() {
        let xml = build_package_create_xml("ZTEST", "desc", None);
        assert!(xml.contains("adtcore:name=\"$TMP\""));
        assert!(xml.contains("adtcore:type=\"DEVC/K\""));
        assert!(xml.contains("packageType=\"development\""));
    }
}
